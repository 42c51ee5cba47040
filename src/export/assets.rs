//! Static assets and the home page.

use std::fs;
use std::path::Path;

use tracing::{info, warn};
use walkdir::WalkDir;

use super::Exporter;
use crate::error::Result;
use crate::render::SiteContext;

/// Template entries copied verbatim into the static folder.
pub const STATIC_ASSETS: &[&str] = &[
    "css",
    "js",
    "jquery",
    "favicon.ico",
    "favicon.png",
    "jquery-ui",
    "datatables",
    "fonts",
    "l10n",
];

/// Replace `dst` with a copy of the directory tree at `src`.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<usize> {
    if dst.exists() {
        fs::remove_dir_all(dst)?;
    }
    let mut copied = 0;
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(std::io::Error::from)?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

impl Exporter<'_> {
    /// Copy [`STATIC_ASSETS`] from the templates directory. Returns how many
    /// entries were missing.
    pub(crate) fn copy_static_assets(&self) -> Result<usize> {
        let templates = &self.config.templates_dir;
        let static_folder = &self.config.static_folder;
        let mut missing = 0;

        for name in STATIC_ASSETS {
            let src = templates.join(name);
            let dst = static_folder.join(name);
            if src.is_dir() {
                let files = copy_tree(&src, &dst)?;
                info!(asset = name, files, "copied asset directory");
            } else if src.is_file() {
                fs::copy(&src, &dst)?;
                info!(asset = name, "copied asset");
            } else {
                warn!(src = %src.display(), "static asset missing from templates");
                missing += 1;
            }
        }
        Ok(missing)
    }

    pub(crate) fn write_home_page(&self, site: &SiteContext) -> Result<()> {
        let path = self.config.static_folder.join("Home.html");
        fs::write(&path, self.renderer.home_page(site))?;
        info!(path = %path.display(), "wrote home page");
        Ok(())
    }
}
