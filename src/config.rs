//! Export settings.
//!
//! Settings come from an optional TOML file; command-line flags override
//! individual keys afterwards.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::catalog::{BookFilter, Format};
use crate::cleanup::{MarkerPair, MarkerTable};
use crate::media::BadCoverList;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Where the static site is written.
    pub static_folder: PathBuf,
    pub download_cache: PathBuf,
    /// SQLite catalog.
    pub database: PathBuf,
    /// Directory holding the static assets (`css`, `js`, ...).
    pub templates_dir: PathBuf,
    /// Scratch space for EPUB patching; the system temp dir when unset.
    pub tmp_folder: Option<PathBuf>,
    pub languages: Vec<String>,
    pub formats: Vec<Format>,
    pub only_books: Vec<u32>,
    pub optimize_images: bool,
    pub bad_covers: BadCoverList,
    /// Appended after the built-in marker table.
    pub markers: Vec<MarkerPair>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            static_folder: PathBuf::from("static"),
            download_cache: PathBuf::from("dl-cache"),
            database: PathBuf::from("gutenberg.db"),
            templates_dir: PathBuf::from("templates"),
            tmp_folder: None,
            languages: Vec::new(),
            formats: Vec::new(),
            only_books: Vec::new(),
            optimize_images: true,
            bad_covers: BadCoverList::default(),
            markers: Vec::new(),
        }
    }
}

impl ExportConfig {
    pub fn book_filter(&self) -> BookFilter {
        BookFilter {
            languages: self.languages.clone(),
            formats: self.formats.clone(),
            only_books: self.only_books.clone(),
        }
    }

    pub fn marker_table(&self) -> MarkerTable {
        MarkerTable::gutenberg().extended(self.markers.iter().cloned())
    }

    /// Formats to export, all known ones when none are configured.
    pub fn export_formats(&self) -> Vec<Format> {
        if self.formats.is_empty() {
            Format::ALL.to_vec()
        } else {
            self.formats.clone()
        }
    }
}

/// Load configuration from `path`, falling back to defaults on error.
pub fn load_config(path: &Path) -> ExportConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "loaded config");
            data
        }
        Err(err) => {
            warn!(path = %path.display(), "falling back to default config: {err}");
            return ExportConfig::default();
        }
    };

    match parse_config(&contents) {
        Ok(cfg) => {
            debug!(?cfg, "parsed configuration");
            cfg
        }
        Err(err) => {
            warn!(path = %path.display(), "invalid config TOML: {err}");
            ExportConfig::default()
        }
    }
}

pub fn parse_config(contents: &str) -> Result<ExportConfig, toml::de::Error> {
    toml::from_str(contents)
}
