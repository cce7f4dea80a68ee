//! File system utilities.

use crate::Result;
use std::path::Path;

/// Check if a path exists and is a directory.
pub fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(crate::Error::PathNotFound(path.display().to_string()));
    }
    if !path.is_dir() {
        return Err(crate::Error::NotADirectory(path.display().to_string()));
    }
    Ok(())
}

/// Create a hard link at `link` pointing to `original`.
pub fn hard_link(original: &Path, link: &Path) -> Result<()> {
    std::fs::hard_link(original, link)?;
    Ok(())
}

/// Create a symbolic link at `link` pointing to `original`.
#[cfg(unix)]
pub fn symlink_file(original: &Path, link: &Path) -> Result<()> {
    std::os::unix::fs::symlink(original, link)?;
    Ok(())
}

/// Create a symbolic link at `link` pointing to `original`.
#[cfg(windows)]
pub fn symlink_file(original: &Path, link: &Path) -> Result<()> {
    std::os::windows::fs::symlink_file(original, link)?;
    Ok(())
}

/// Whether anything (including a dangling symlink) exists at `path`.
pub fn entry_exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}
