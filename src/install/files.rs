//! Filesystem helpers for placing and removing the installation.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::Result;

/// Permissions for directories and executables.
pub const DIR_MODE: u32 = 0o755;
/// Permissions for plain payload files.
pub const FILE_MODE: u32 = 0o644;
/// Permissions for rc.d scripts.
pub const RC_SCRIPT_MODE: u32 = 0o555;

/// Delete a file, symlink or directory tree.
///
/// Returns whether anything was removed.
pub fn remove_if_exists(path: &Path) -> Result<bool> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };

    if meta.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    tracing::debug!("removed {}", path.display());
    Ok(true)
}

/// Create a directory (and parents) with `mode`.
pub fn ensure_dir(path: &Path, mode: u32) -> Result<()> {
    if !path.is_dir() {
        fs::create_dir_all(path)?;
        tracing::debug!("created directory {}", path.display());
    }
    set_mode(path, mode)
}

/// Set unix permission bits. No-op elsewhere.
pub fn set_mode(path: &Path, mode: u32) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = (path, mode);
    Ok(())
}

/// Write `contents` to `path` with `mode`, creating parent directories.
pub fn write_file(path: &Path, contents: &str, mode: u32) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    set_mode(path, mode)?;
    tracing::debug!("wrote {} ({:o})", path.display(), mode);
    Ok(())
}

/// Replace `to` with the directory `from`.
///
/// Falls back to a recursive copy when `from` lives on another filesystem.
pub fn replace_dir(from: &Path, to: &Path) -> Result<()> {
    remove_if_exists(to)?;
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }

    if let Err(e) = fs::rename(from, to) {
        tracing::debug!("rename failed ({}), copying {} instead", e, from.display());
        copy_tree(from, to)?;
        remove_if_exists(from)?;
    }
    tracing::debug!("move {} to {}", from.display(), to.display());
    Ok(())
}

fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Normalize permissions below `dir`.
///
/// Directories and the named executables get 0755, every other file 0644.
pub fn normalize_permissions(dir: &Path, executables: &[&str]) -> Result<()> {
    set_mode(dir, DIR_MODE)?;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            normalize_permissions(&path, executables)?;
        } else if file_type.is_file() {
            let name = entry.file_name();
            let mode = if executables.iter().any(|e| name == *e) {
                DIR_MODE
            } else {
                FILE_MODE
            };
            tracing::debug!("set file permission {} to {:o}", path.display(), mode);
            set_mode(&path, mode)?;
        }
    }
    Ok(())
}

/// Point `link` at `target`, replacing whatever was there.
pub fn replace_symlink(target: &Path, link: &Path) -> Result<()> {
    remove_if_exists(link)?;
    if let Some(parent) = link.parent() {
        fs::create_dir_all(parent)?;
    }

    #[cfg(unix)]
    std::os::unix::fs::symlink(target, link)?;
    #[cfg(not(unix))]
    fs::copy(target, link).map(|_| ())?;

    tracing::debug!("linked {} -> {}", link.display(), target.display());
    Ok(())
}

/// Whether any line of `path` contains `needle`. A missing file contains nothing.
pub fn file_contains(path: &Path, needle: &str) -> Result<bool> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text.lines().any(|line| line.contains(needle))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Append `line` to `path` unless a line already mentions `key`.
///
/// Returns whether the file changed.
pub fn ensure_line(path: &Path, key: &str, line: &str) -> Result<bool> {
    if file_contains(path, key)? {
        return Ok(false);
    }

    let mut text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
    text.push_str(line);
    text.push('\n');

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)?;
    tracing::debug!("added '{}' to {}", line, path.display());
    Ok(true)
}

/// Drop every line of `path` that mentions `key`.
///
/// Returns whether the file changed.
pub fn remove_lines(path: &Path, key: &str) -> Result<bool> {
    if !file_contains(path, key)? {
        return Ok(false);
    }

    let text = fs::read_to_string(path)?;
    let kept: String = text
        .split_inclusive('\n')
        .filter(|line| !line.contains(key))
        .collect();
    fs::write(path, kept)?;
    tracing::debug!("removed '{}' lines from {}", key, path.display());
    Ok(true)
}
