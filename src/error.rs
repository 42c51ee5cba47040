//! Error types for export operations.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors that can occur while exporting the catalog.
///
/// Most of these are recoverable at the scope of a single file or book: the
/// exporter logs them and moves on. Only [`Error::OutputDirectory`] and catalog
/// failures abort a run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("catalog error: {0}")]
    Catalog(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("missing source file: {}", .0.display())]
    MissingSource(PathBuf),

    #[error("`{command}` failed with {status}")]
    Subprocess { command: String, status: ExitStatus },

    #[error("markup anomaly: {0}")]
    MarkupParse(String),

    #[error("missing manifest entry: {0}")]
    MissingManifestEntry(String),

    #[error("invalid EPUB: {0}")]
    InvalidEpub(String),

    #[error("cannot create output directory {}: {source}", path.display())]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
