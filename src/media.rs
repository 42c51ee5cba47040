//! Image optimization and cover-quality checks.
//!
//! Optimization shells out to the usual command-line tools. A tool that fails
//! or is missing leaves the file as it was.

use std::fs;
use std::path::Path;
use std::process::Command;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::util::extension;

/// Runs format-specific optimizers on image files in place.
#[derive(Debug, Clone, Copy)]
pub struct ImageOptimizer {
    enabled: bool,
}

impl ImageOptimizer {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    /// Optimize `path` according to its extension. Other files are ignored.
    pub fn optimize(&self, path: &Path) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let file = path.display().to_string();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();

        match extension(name).as_deref() {
            Some("png") => {
                run("pngquant", &["--nofs", "--force", "--ext=.png", &file])?;
                run("advdef", &["-z", "-4", "-i", "5", &file])
            }
            Some("jpg" | "jpeg") => run("jpegoptim", &["--strip-all", "-m50", &file]),
            Some("gif") => run("gifsicle", &["-O3", &file, "-o", &file]),
            _ => Ok(()),
        }
    }

    /// [`optimize`](Self::optimize), logging failures instead of returning them.
    pub fn optimize_or_warn(&self, path: &Path) {
        if let Err(err) = self.optimize(path) {
            warn!(path = %path.display(), "image left unoptimized: {err}");
        }
    }
}

fn run(program: &str, args: &[&str]) -> Result<()> {
    debug!(program, ?args, "running optimizer");
    let output = Command::new(program).args(args).output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(program, stderr = %stderr.trim(), "optimizer reported failure");
        return Err(Error::Subprocess {
            command: format!("{program} {}", args.join(" ")),
            status: output.status,
        });
    }
    Ok(())
}

/// Known placeholder covers, identified by byte size and SHA-1 digest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BadCoverList {
    pub sizes: Vec<u64>,
    /// Lowercase hex digests.
    pub sha1: Vec<String>,
}

impl Default for BadCoverList {
    fn default() -> Self {
        Self {
            sizes: vec![19263],
            sha1: Vec::new(),
        }
    }
}

impl BadCoverList {
    /// Whether the image at `path` is a known placeholder.
    ///
    /// The size check runs first so most files are never hashed.
    pub fn is_bad_cover(&self, path: &Path) -> Result<bool> {
        let size = fs::metadata(path)?.len();
        if !self.sizes.contains(&size) {
            return Ok(false);
        }
        let digest = sha1_smol::Sha1::from(fs::read(path)?).digest().to_string();
        Ok(self.sha1.iter().any(|d| d.eq_ignore_ascii_case(&digest)))
    }
}
