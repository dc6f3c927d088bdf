//! Release archive extraction.

use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use zip::ZipArchive;

use crate::error::{HelperError, Result};

/// Extract a zip archive into `dest` and return the payload root.
///
/// Older releases wrap everything in one `v2ray-vX.Y-linux-64/` directory;
/// newer ones are flat. The payload root is that single top-level directory
/// when there is one, and `dest` otherwise.
pub fn extract_zip(archive_path: &Path, dest: &Path) -> Result<PathBuf> {
    let archive_err = |message: String| HelperError::Archive {
        path: archive_path.to_path_buf(),
        message,
    };

    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| archive_err(e.to_string()))?;
    fs::create_dir_all(dest)?;

    let mut top_level: BTreeSet<OsString> = BTreeSet::new();
    let mut has_root_files = false;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| archive_err(e.to_string()))?;

        let Some(relative) = entry.enclosed_name().map(|p| p.to_path_buf()) else {
            tracing::warn!("skipping unsafe archive entry {}", entry.name());
            continue;
        };

        let mut components = relative.components().filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_os_string()),
            _ => None,
        });
        if let Some(first) = components.next() {
            if components.next().is_none() && !entry.is_dir() {
                has_root_files = true;
            }
            top_level.insert(first);
        }

        let target = dest.join(&relative);
        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        io::copy(&mut entry, &mut out)?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&target, fs::Permissions::from_mode(mode & 0o7777))?;
        }
    }

    if top_level.is_empty() {
        return Err(archive_err("archive is empty".to_string()));
    }

    let root = match (has_root_files, top_level.len()) {
        (false, 1) => top_level
            .into_iter()
            .next()
            .map(|name| dest.join(name))
            .unwrap_or_else(|| dest.to_path_buf()),
        _ => dest.to_path_buf(),
    };
    tracing::debug!("file extracted to {}", root.display());
    Ok(root)
}
