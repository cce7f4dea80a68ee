//! Directory scanner module.
//!
//! Lists the files under the input directory that the renamer should handle:
//! allow-listed extensions only, hidden entries skipped, paths relative to
//! the root and sorted.

use crate::utils::fs::ensure_directory;
use crate::{Error, Result};
use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Sorted relative paths of the files to rename.
///
/// Built once per run. Positions in this list are the indices exchanged
/// with the completion service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileList {
    files: Vec<String>,
}

impl FileList {
    /// Build a list from relative paths, sorting them.
    pub fn new(mut files: Vec<String>) -> Self {
        files.sort();
        Self { files }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.files.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.files
    }
}

/// Check whether an entry name marks it hidden.
fn is_hidden(entry: &DirEntry) -> bool {
    is_hidden_name(entry.file_name())
}

fn is_hidden_name(name: &OsStr) -> bool {
    name.as_encoded_bytes().starts_with(b".")
}

fn is_dangling_link(path: &Path) -> bool {
    std::fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
        && std::fs::metadata(path).is_err()
}

/// Walk errors that concern nothing the listing would contain: hidden
/// entries, and dangling links the extension filter drops anyway.
fn is_outside_listing(err: &walkdir::Error, exts: &[String]) -> bool {
    let Some(path) = err.path() else {
        return false;
    };
    if err.depth() > 0 && path.file_name().map(is_hidden_name).unwrap_or(false) {
        return true;
    }
    is_dangling_link(path) && !has_allowed_extension(path, exts)
}

/// Check a file name against the extension allow-list.
///
/// Matching is case-sensitive and includes the leading dot, so `.mkv`
/// matches `a.mkv` but not `a.MKV`.
fn has_allowed_extension(path: &Path, exts: &[String]) -> bool {
    let ext = match path.extension() {
        Some(ext) => format!(".{}", ext.to_string_lossy()),
        None => return false,
    };
    exts.iter().any(|allowed| *allowed == ext)
}

/// Identity of the file behind a path, shared by hard links and symlinks
/// to the same file.
#[cfg(unix)]
fn file_identity(entry: &DirEntry) -> Option<(u64, u64)> {
    use std::os::unix::fs::MetadataExt;
    entry.metadata().ok().map(|m| (m.dev(), m.ino()))
}

#[cfg(not(unix))]
fn file_identity(entry: &DirEntry) -> Option<std::path::PathBuf> {
    std::fs::canonicalize(entry.path()).ok()
}

/// List files under `root` whose extension is in `exts`.
///
/// Hidden files and directories (name starting with `.`) are skipped along
/// with their subtree. Symbolic links are followed; a link cycle is logged
/// and skipped. Any other walk error that touches a listable entry
/// (unreadable directory, dangling link with an allowed extension) fails
/// the listing. A matching path that is not valid UTF-8 fails too.
/// When several paths reach the same file, only the first in sorted order
/// is kept.
///
/// # Arguments
/// * `root` - The directory to scan
/// * `exts` - Allowed extensions, each including the leading dot
pub fn list_files(root: &Path, exts: &[String]) -> Result<FileList> {
    ensure_directory(root)?;

    let mut found: Vec<(String, DirEntry)> = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.loop_ancestor().is_some() => {
                tracing::warn!("Skipping symlink loop: {}", e);
                continue;
            }
            Err(e) if is_outside_listing(&e, exts) => {
                tracing::debug!("Ignoring walk error outside the listing: {}", e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if !entry.file_type().is_file() || !has_allowed_extension(entry.path(), exts) {
            continue;
        }

        let relative = match entry.path().strip_prefix(root) {
            Ok(rel) => rel
                .to_str()
                .ok_or_else(|| Error::NonUtf8Path(rel.display().to_string()))?
                .to_string(),
            Err(_) => continue,
        };
        found.push((relative, entry));
    }

    found.sort_by(|a, b| a.0.cmp(&b.0));

    let mut seen = HashSet::new();
    let mut files = Vec::with_capacity(found.len());
    for (relative, entry) in found {
        match file_identity(&entry) {
            Some(id) if !seen.insert(id) => {
                tracing::debug!("Duplicate of an earlier file, skipping: {}", relative);
            }
            _ => files.push(relative),
        }
    }

    tracing::info!("Found {} files in {}", files.len(), root.display());

    Ok(FileList { files })
}
