use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use super::ncx::{FULL_LICENSE_MARKER, truncate_ncx};
use super::opf::remove_href_elements;
use crate::cleanup::MarkerTable;
use crate::error::{Error, Result};
use crate::media::{BadCoverList, ImageOptimizer};
use crate::page::{PageMode, prepare_page};
use crate::util::{decode_text, extension, is_html_name, is_image_name};

const MIMETYPE: &str = "mimetype";
const EPUB_MIMETYPE: &[u8] = b"application/epub+zip";
const COVER_NAME: &str = "cover.jpg";

/// An archive member, in original order.
struct Entry {
    name: String,
    /// Extracted location; `None` for directories.
    path: Option<PathBuf>,
}

/// What [`EpubPatcher::patch`] did to an archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchReport {
    pub entries: usize,
    pub pages: usize,
    pub pages_stripped: usize,
    pub cover_removed: bool,
    pub ncx_truncated: bool,
}

/// Rewrites catalog EPUBs: boilerplate out, images optimized, placeholder
/// cover dropped.
#[derive(Debug, Clone)]
pub struct EpubPatcher<'a> {
    markers: &'a MarkerTable,
    bad_covers: &'a BadCoverList,
    optimizer: ImageOptimizer,
    tmp_dir: Option<PathBuf>,
}

impl<'a> EpubPatcher<'a> {
    pub fn new(markers: &'a MarkerTable, bad_covers: &'a BadCoverList) -> Self {
        Self {
            markers,
            bad_covers,
            optimizer: ImageOptimizer::disabled(),
            tmp_dir: None,
        }
    }

    pub fn with_optimizer(mut self, optimizer: ImageOptimizer) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Extract into this directory instead of the system temp dir.
    pub fn with_tmp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.tmp_dir = Some(dir.into());
        self
    }

    /// Patch `src` into a new archive at `dst`.
    ///
    /// The extraction directory is removed when this returns, whether or
    /// not patching succeeded.
    pub fn patch(&self, src: &Path, dst: &Path) -> Result<PatchReport> {
        info!(src = %src.display(), dst = %dst.display(), "patching EPUB");
        let workdir = match &self.tmp_dir {
            Some(dir) => TempDir::new_in(dir)?,
            None => TempDir::new()?,
        };

        let mut entries = extract(src, workdir.path())?;
        let mut report = PatchReport {
            entries: entries.len(),
            ..Default::default()
        };

        let mut removed_cover: Option<PathBuf> = None;
        entries.retain(|entry| {
            let Some(path) = &entry.path else {
                return true;
            };
            if !is_image_name(&entry.name) {
                return true;
            }
            if removed_cover.is_none()
                && file_name(&entry.name) == COVER_NAME
                && self.is_bad_cover(path)
            {
                info!(entry = %entry.name, "dropping placeholder cover");
                removed_cover = Some(path.clone());
                return false;
            }
            self.optimizer.optimize_or_warn(path);
            true
        });

        for entry in &entries {
            let Some(path) = &entry.path else { continue };
            if is_html_name(&entry.name) {
                report.pages += 1;
                if self.patch_page(path)? {
                    report.pages_stripped += 1;
                }
            } else if extension(&entry.name).as_deref() == Some("ncx") {
                report.ncx_truncated |= patch_ncx(path)?;
            }
        }

        if let Some(cover) = removed_cover {
            remove_cover(&cover)?;
            report.cover_removed = true;
        }

        repack(&entries, dst)?;
        debug!(?report, "EPUB patched");
        Ok(report)
    }

    fn is_bad_cover(&self, path: &Path) -> bool {
        self.bad_covers.is_bad_cover(path).unwrap_or_else(|err| {
            warn!(path = %path.display(), "cannot check cover: {err}");
            false
        })
    }

    fn patch_page(&self, path: &Path) -> Result<bool> {
        let raw = fs::read(path)?;
        let page = prepare_page(&raw, PageMode::Epub, self.markers);
        fs::write(path, page.html)?;
        Ok(page.outcome.is_stripped())
    }
}

fn file_name(entry: &str) -> &str {
    entry.rsplit('/').next().unwrap_or(entry)
}

fn extract(src: &Path, dir: &Path) -> Result<Vec<Entry>> {
    let mut archive = ZipArchive::new(File::open(src)?)?;
    if archive.is_empty() {
        return Err(Error::InvalidEpub(format!("{} has no entries", src.display())));
    }
    let mut entries = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let name = file.name().to_string();
        let Some(relative) = file.enclosed_name() else {
            warn!(entry = %name, "skipping entry with unsafe path");
            continue;
        };
        let path = dir.join(relative);

        if file.is_dir() {
            fs::create_dir_all(&path)?;
            entries.push(Entry { name, path: None });
            continue;
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&path)?;
        io::copy(&mut file, &mut out)?;
        entries.push(Entry {
            name,
            path: Some(path),
        });
    }

    Ok(entries)
}

fn patch_ncx(path: &Path) -> Result<bool> {
    let raw = fs::read(path)?;
    let ncx = decode_text(&raw, Some("utf-8"));
    match truncate_ncx(&ncx, FULL_LICENSE_MARKER) {
        Ok(Some(truncated)) => {
            fs::write(path, truncated)?;
            Ok(true)
        }
        Ok(None) => Ok(false),
        Err(err) => {
            warn!(path = %path.display(), "navigation map left as is: {err}");
            Ok(false)
        }
    }
}

/// Delete the extracted cover and its references in the sibling
/// `content.opf`.
fn remove_cover(cover: &Path) -> Result<()> {
    fs::remove_file(cover)?;

    let Some(opf_path) = cover.parent().map(|dir| dir.join("content.opf")) else {
        return Ok(());
    };
    if !opf_path.is_file() {
        let err = Error::MissingManifestEntry(opf_path.display().to_string());
        warn!("cover references not removed: {err}");
        return Ok(());
    }

    let raw = fs::read(&opf_path)?;
    let opf = decode_text(&raw, Some("utf-8"));
    match remove_href_elements(&opf, COVER_NAME) {
        Ok((patched, removed)) => {
            debug!(removed, "removed cover references from package");
            fs::write(&opf_path, patched)?;
        }
        Err(err) => warn!(path = %opf_path.display(), "package left as is: {err}"),
    }
    Ok(())
}

/// Write the archive: `mimetype` first and stored, the rest deflated in
/// original order.
fn repack(entries: &[Entry], dst: &Path) -> Result<()> {
    let stored = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    let deflated =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut zip = ZipWriter::new(File::create(dst)?);

    zip.start_file(MIMETYPE, stored)?;
    match entries.iter().find(|e| e.name == MIMETYPE).and_then(|e| e.path.as_ref()) {
        Some(path) => zip.write_all(&fs::read(path)?)?,
        None => {
            warn!("source archive has no mimetype entry, writing the standard one");
            zip.write_all(EPUB_MIMETYPE)?;
        }
    }

    for entry in entries.iter().filter(|e| e.name != MIMETYPE) {
        match &entry.path {
            None => zip.add_directory(entry.name.as_str(), deflated)?,
            Some(path) => {
                zip.start_file(entry.name.as_str(), deflated)?;
                zip.write_all(&fs::read(path)?)?;
            }
        }
    }

    zip.finish()?;
    Ok(())
}
