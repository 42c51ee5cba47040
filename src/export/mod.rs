//! Export of the filtered catalog to a static site.
//!
//! One run loads the filtered collection, ranks it by popularity, writes the
//! JS data files, static assets and home page, then exports each book in
//! turn. A failure inside one book is logged and the run moves on; only an
//! unusable output directory or catalog aborts it.
//!
//! # Example
//!
//! ```no_run
//! use gutenberg_export::{Catalog, ExportConfig, Exporter};
//!
//! let config = ExportConfig::default();
//! let catalog = Catalog::open(&config.database)?;
//! let summary = Exporter::new(&config).export_all_books(&catalog)?;
//! println!("{} books exported", summary.books);
//! # Ok::<(), gutenberg_export::Error>(())
//! ```

mod assets;
mod book;
mod files;

pub use assets::{STATIC_ASSETS, copy_tree};
pub use files::{Handled, copy_file, link_file};

use std::fs;

use tracing::{debug, error, info, warn};

use crate::cache::DownloadCache;
use crate::catalog::{Book, Catalog, Format, languages_with_count};
use crate::cleanup::MarkerTable;
use crate::config::ExportConfig;
use crate::datafiles::export_data_files;
use crate::error::{Error, Result};
use crate::media::ImageOptimizer;
use crate::popularity::PopularityThresholds;
use crate::render::{HtmlRenderer, Renderer, SiteContext};

/// Counters for one export run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Books fully processed.
    pub books: usize,
    pub books_failed: usize,
    pub pages: usize,
    pub pages_stripped: usize,
    /// Pages with no recognised boilerplate.
    pub pages_unchanged: usize,
    /// Pages whose body is a single wrapping element.
    pub already_clean: usize,
    pub pages_failed: usize,
    pub images: usize,
    pub epubs_patched: usize,
    pub files_linked: usize,
    pub data_files: usize,
    pub missing_sources: usize,
    pub skipped_files: usize,
    pub missing_assets: usize,
}

/// Drives an export run.
pub struct Exporter<'a> {
    config: &'a ExportConfig,
    renderer: Box<dyn Renderer>,
    markers: MarkerTable,
    cache: DownloadCache,
    optimizer: ImageOptimizer,
}

impl<'a> Exporter<'a> {
    pub fn new(config: &'a ExportConfig) -> Self {
        Self {
            config,
            renderer: Box::new(HtmlRenderer),
            markers: config.marker_table(),
            cache: DownloadCache::new(&config.download_cache),
            optimizer: ImageOptimizer::new(config.optimize_images),
        }
    }

    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    /// Export every book matching the configured filters.
    pub fn export_all_books(&self, catalog: &Catalog) -> Result<ExportSummary> {
        let static_folder = &self.config.static_folder;
        fs::create_dir_all(static_folder).map_err(|source| Error::OutputDirectory {
            path: static_folder.clone(),
            source,
        })?;

        let mut books = catalog.filtered_books(&self.config.book_filter())?;
        info!(count = books.len(), "filtered book collection");
        for format in Format::ALL {
            let count = books.iter().filter(|b| b.has_format(format)).count();
            debug!(%format, count, "filtered books by format");
        }

        rank_by_popularity(&mut books);

        let mut summary = ExportSummary {
            data_files: export_data_files(&books, static_folder)?,
            ..Default::default()
        };
        summary.missing_assets = self.copy_static_assets()?;

        let site = SiteContext::new(languages_with_count(&books));
        self.write_home_page(&site)?;

        let listing = self.cache.list().unwrap_or_else(|err| {
            warn!(root = %self.cache.root().display(), "cannot list download cache: {err}");
            Vec::new()
        });
        for book in &books {
            if let Err(err) = self.export_book(book, &listing, &site, &mut summary) {
                error!(book = book.id, "book export failed: {err}");
                summary.books_failed += 1;
            }
        }

        info!(?summary, "export finished");
        Ok(summary)
    }
}

/// Set the star rating of every book from the collection's download ranks.
pub fn rank_by_popularity(books: &mut [Book]) -> PopularityThresholds {
    let mut downloads: Vec<u64> = books.iter().map(|b| b.downloads).collect();
    downloads.sort_unstable_by(|a, b| b.cmp(a));
    let thresholds = PopularityThresholds::compute(&downloads);
    debug!(limits = ?thresholds.limits(), "popularity thresholds");

    for book in books.iter_mut() {
        book.popularity = thresholds.stars_for(book.downloads);
    }
    thresholds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::book;

    #[test]
    fn test_rank_by_popularity() {
        let mut books: Vec<Book> = [10, 100, 80, 90, 80, 100, 80]
            .iter()
            .enumerate()
            .map(|(i, &d)| book(i as u32 + 1, "t", "en", d))
            .collect();
        let thresholds = rank_by_popularity(&mut books);
        assert_eq!(thresholds.limits(), &[0, 0, 80, 90, 100]);
        let stars: Vec<u8> = books.iter().map(|b| b.popularity).collect();
        assert_eq!(stars, vec![2, 5, 3, 4, 3, 5, 3]);
    }

    #[test]
    fn test_unwritable_output_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();

        let config = ExportConfig {
            static_folder: blocker.join("site"),
            ..Default::default()
        };
        let catalog = Catalog::in_memory().unwrap();
        let err = Exporter::new(&config).export_all_books(&catalog).unwrap_err();
        assert!(matches!(err, Error::OutputDirectory { .. }));
    }
}
