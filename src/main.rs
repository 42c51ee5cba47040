//! gutenberg-export - static site exporter for the ebook catalog

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use gutenberg_export::{
    Catalog, EpubPatcher, ExportConfig, Exporter, Format, ImageOptimizer, PageMode, load_config,
    prepare_page,
};

#[derive(Parser)]
#[command(name = "gutenberg-export")]
#[command(version, about = "Export the ebook catalog to a static website", long_about = None)]
#[command(after_help = "EXAMPLES:
    gutenberg-export export --languages en,fr        Export English and French books
    gutenberg-export strip 1342.html > clean.html    Strip boilerplate from one page
    gutenberg-export patch-epub 1342.epub out.epub   Patch a single EPUB")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log debug details
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export the filtered catalog to the static folder
    Export(ExportArgs),

    /// Strip boilerplate from a single HTML file
    Strip {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Write here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Patch a single EPUB archive
    PatchEpub {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Catalog id of the book, for log context
        #[arg(long)]
        book_id: Option<u32>,
    },
}

#[derive(Args)]
struct ExportArgs {
    #[arg(long, value_name = "DIR")]
    static_folder: Option<PathBuf>,

    #[arg(long, value_name = "DIR")]
    download_cache: Option<PathBuf>,

    #[arg(long, value_name = "FILE")]
    database: Option<PathBuf>,

    #[arg(long, value_name = "DIR")]
    templates_dir: Option<PathBuf>,

    /// Comma-separated language codes
    #[arg(long, value_delimiter = ',')]
    languages: Vec<String>,

    /// Comma-separated formats (html, epub, pdf)
    #[arg(long, value_delimiter = ',')]
    formats: Vec<Format>,

    /// Comma-separated book ids
    #[arg(long, value_delimiter = ',')]
    books: Vec<u32>,

    /// Skip image optimization
    #[arg(long)]
    no_optimize: bool,
}

impl ExportArgs {
    fn apply(self, config: &mut ExportConfig) {
        if let Some(dir) = self.static_folder {
            config.static_folder = dir;
        }
        if let Some(dir) = self.download_cache {
            config.download_cache = dir;
        }
        if let Some(file) = self.database {
            config.database = file;
        }
        if let Some(dir) = self.templates_dir {
            config.templates_dir = dir;
        }
        if !self.languages.is_empty() {
            config.languages = self.languages;
        }
        if !self.formats.is_empty() {
            config.formats = self.formats;
        }
        if !self.books.is_empty() {
            config.only_books = self.books;
        }
        if self.no_optimize {
            config.optimize_images = false;
        }
    }
}

fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let config = cli
        .config
        .as_deref()
        .map(load_config)
        .unwrap_or_default();

    let result = match cli.command {
        Command::Export(args) => export(config, args),
        Command::Strip { input, output } => strip(&config, &input, output.as_deref()),
        Command::PatchEpub {
            input,
            output,
            book_id,
        } => patch_epub(&config, &input, &output, book_id),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn export(mut config: ExportConfig, args: ExportArgs) -> gutenberg_export::Result<()> {
    args.apply(&mut config);
    let catalog = Catalog::open(&config.database)?;
    let summary = Exporter::new(&config).export_all_books(&catalog)?;
    info!(
        books = summary.books,
        failed = summary.books_failed,
        pages = summary.pages,
        stripped = summary.pages_stripped,
        "done"
    );
    Ok(())
}

fn strip(
    config: &ExportConfig,
    input: &Path,
    output: Option<&Path>,
) -> gutenberg_export::Result<()> {
    let raw = fs::read(input)?;
    let page = prepare_page(&raw, PageMode::Epub, &config.marker_table());
    info!(outcome = ?page.outcome, "stripped");
    match output {
        Some(path) => fs::write(path, page.html)?,
        None => print!("{}", page.html),
    }
    Ok(())
}

fn patch_epub(
    config: &ExportConfig,
    input: &Path,
    output: &Path,
    book_id: Option<u32>,
) -> gutenberg_export::Result<()> {
    let _span = tracing::info_span!("book", id = book_id).entered();
    let markers = config.marker_table();
    let mut patcher = EpubPatcher::new(&markers, &config.bad_covers)
        .with_optimizer(ImageOptimizer::new(config.optimize_images));
    if let Some(dir) = &config.tmp_folder {
        patcher = patcher.with_tmp_dir(dir);
    }
    let report = patcher.patch(input, output)?;
    info!(
        pages = report.pages,
        stripped = report.pages_stripped,
        cover_removed = report.cover_removed,
        ncx_truncated = report.ncx_truncated,
        "patched"
    );
    Ok(())
}
