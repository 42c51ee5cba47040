//! Moving cache files into the static folder.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, info};

use super::Exporter;
use crate::epub::EpubPatcher;
use crate::error::{Error, Result};
use crate::util::{extension, is_image_name};

/// Files Windows Explorer leaves behind.
const THUMBS_DB: &str = "_Thumbs.db";

/// How a companion or format file was brought over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Image,
    Epub,
    Linked,
    Skipped,
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
        _ => Ok(()),
    }
}

/// Copy `src` over `dst`.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if !src.is_file() {
        return Err(Error::MissingSource(src.to_path_buf()));
    }
    remove_if_exists(dst)?;
    fs::copy(src, dst)?;
    Ok(())
}

/// Hard-link `src` to `dst`, copying when linking is not possible.
pub fn link_file(src: &Path, dst: &Path) -> Result<()> {
    if !src.is_file() {
        return Err(Error::MissingSource(src.to_path_buf()));
    }
    remove_if_exists(dst)?;
    if let Err(err) = fs::hard_link(src, dst) {
        debug!(src = %src.display(), "hard link failed, copying: {err}");
        fs::copy(src, dst)?;
    }
    Ok(())
}

impl Exporter<'_> {
    /// Bring one non-HTML cache file over to `dst`.
    pub(crate) fn handle_companion_file(&self, src: &Path, dst: &Path) -> Result<Handled> {
        let name = src.file_name().and_then(|n| n.to_str()).unwrap_or_default();

        if is_image_name(name) {
            info!(dst = %dst.display(), "copying image");
            copy_file(src, dst)?;
            self.optimizer.optimize_or_warn(dst);
            return Ok(Handled::Image);
        }

        if extension(name).as_deref() == Some("epub") {
            if !src.is_file() {
                return Err(Error::MissingSource(src.to_path_buf()));
            }
            self.patch_epub_into(src, dst)?;
            return Ok(Handled::Epub);
        }

        if name.ends_with(THUMBS_DB) {
            debug!(src = %src.display(), "skipping thumbnail cache");
            return Ok(Handled::Skipped);
        }

        info!(dst = %dst.display(), "linking file");
        link_file(src, dst)?;
        Ok(Handled::Linked)
    }

    /// Patch into a temp file, then move it into place.
    fn patch_epub_into(&self, src: &Path, dst: &Path) -> Result<()> {
        let mut builder = tempfile::Builder::new();
        builder.suffix(".epub");
        let tmp = match &self.config.tmp_folder {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        }
        .into_temp_path();

        let mut patcher = EpubPatcher::new(&self.markers, &self.config.bad_covers)
            .with_optimizer(self.optimizer);
        if let Some(dir) = &self.config.tmp_folder {
            patcher = patcher.with_tmp_dir(dir);
        }
        let report = patcher.patch(src, &tmp)?;
        debug!(?report, "patched EPUB");

        remove_if_exists(dst)?;
        if let Err(err) = tmp.persist(dst) {
            // rename fails across filesystems
            fs::copy(&err.path, dst)?;
        }
        Ok(())
    }
}
