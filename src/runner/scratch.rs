//! Per-run scratch directory for downloads and extraction.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tempfile::TempDir;

use crate::error::Result;

/// Exit code used when the run is interrupted.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Temporary directory removed when dropped, and on Ctrl-C.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create a fresh scratch directory in the system temp location.
    pub fn create() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("v2ray-helper-")
            .tempdir()
            .context("Failed to create scratch directory")?;
        tracing::debug!("scratch directory {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the directory and exit when the user hits Ctrl-C.
    ///
    /// The handler is process wide. A second registration only logs.
    pub fn remove_on_interrupt(&self) {
        let path: PathBuf = self.dir.path().to_path_buf();
        let registered = ctrlc::set_handler(move || {
            tracing::info!("Quitting...");
            if let Err(e) = std::fs::remove_dir_all(&path) {
                tracing::debug!("cannot remove {}: {}", path.display(), e);
            }
            std::process::exit(INTERRUPTED_EXIT_CODE);
        });
        if let Err(e) = registered {
            tracing::debug!("Ctrl-C handler not installed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_on_drop() {
        let scratch = ScratchDir::create().unwrap();
        let path = scratch.path().to_path_buf();
        std::fs::write(path.join("v2ray-linux-64.zip"), b"zip").unwrap();
        assert!(path.is_dir());

        drop(scratch);
        assert!(!path.exists());
    }
}
