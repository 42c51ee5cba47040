//! Download cache layout.
//!
//! The cache is a flat directory: `{id}.{format}` for the main formats and
//! `{id}_{name}` for every companion file (images, extra pages, extra
//! archives).

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::catalog::{Book, Format};
use crate::error::{Error, Result};
use crate::naming::{companion_prefix, fname_for};

#[derive(Debug, Clone)]
pub struct DownloadCache {
    root: PathBuf,
}

impl DownloadCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Cache path of a main format file, whether or not it exists.
    pub fn path_for(&self, book: &Book, format: Format) -> PathBuf {
        self.root.join(fname_for(book, format))
    }

    /// Like [`path_for`](Self::path_for) but fails with
    /// [`Error::MissingSource`] when the file is absent.
    pub fn existing(&self, book: &Book, format: Format) -> Result<PathBuf> {
        let path = self.path_for(book, format);
        if path.is_file() {
            Ok(path)
        } else {
            Err(Error::MissingSource(path))
        }
    }

    /// Sorted names of the regular files in the cache.
    ///
    /// Listed once per run; [`companions_in`] then picks each book's files.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        debug!(root = %self.root.display(), count = names.len(), "listed download cache");
        Ok(names)
    }
}

/// The `{id}_*` companions of a book within a sorted cache listing.
pub fn companions_in(listing: &[String], book_id: u32) -> &[String] {
    let prefix = companion_prefix(book_id);
    let start = listing.partition_point(|name| name.as_str() < prefix.as_str());
    let len = listing[start..]
        .iter()
        .take_while(|name| name.starts_with(&prefix))
        .count();
    &listing[start..start + len]
}
