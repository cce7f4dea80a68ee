//! Integration tests for the scanner module.
//!
//! Tests cover:
//! - Sorted, repeatable listings
//! - Extension filtering at any depth
//! - Hidden file and directory exclusion
//! - Duplicate, cyclic and dangling links
//! - Non-UTF-8 names
//! - Error handling for non-existent paths

use shows_rename::core::scanner::list_files;
use shows_rename::models::config::DEFAULT_EXTS;
use shows_rename::Error;
use std::fs;
use std::path::{Path, MAIN_SEPARATOR};
use tempfile::TempDir;

fn default_exts() -> Vec<String> {
    DEFAULT_EXTS.iter().map(|e| e.to_string()).collect()
}

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, "fake").unwrap();
}

fn rel(parts: &[&str]) -> String {
    parts.join(&MAIN_SEPARATOR.to_string())
}

#[test]
fn test_list_empty_directory() {
    let temp_dir = TempDir::new().unwrap();
    let files = list_files(temp_dir.path(), &default_exts()).unwrap();
    assert!(files.is_empty());
}

#[test]
fn test_list_is_sorted_and_stable() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    touch(&root.join("b.mkv"));
    touch(&root.join("a.mkv"));
    touch(&root.join("Season 2").join("03.mkv"));
    touch(&root.join("Season 1").join("01.ass"));

    let first = list_files(root, &default_exts()).unwrap();
    let second = list_files(root, &default_exts()).unwrap();

    let mut sorted = first.as_slice().to_vec();
    sorted.sort();
    assert_eq!(first.as_slice(), sorted.as_slice());
    assert_eq!(first, second);
    assert_eq!(
        first.as_slice(),
        &[
            rel(&["Season 1", "01.ass"]),
            rel(&["Season 2", "03.mkv"]),
            "a.mkv".to_string(),
            "b.mkv".to_string(),
        ]
    );
}

#[test]
fn test_extension_filter_at_any_depth() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    touch(&root.join("ep01.mkv"));
    touch(&root.join("ep01.nfo"));
    touch(&root.join("deep").join("er").join("ep02.srt"));
    touch(&root.join("deep").join("er").join("cover.jpg"));
    touch(&root.join("upper.MKV"));
    touch(&root.join("noext"));

    let files = list_files(root, &default_exts()).unwrap();

    assert_eq!(
        files.as_slice(),
        &[rel(&["deep", "er", "ep02.srt"]), "ep01.mkv".to_string()]
    );
}

#[test]
fn test_custom_extensions() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    touch(&root.join("a.mkv"));
    touch(&root.join("a.mp4"));

    let files = list_files(root, &[".mp4".to_string()]).unwrap();
    assert_eq!(files.as_slice(), &["a.mp4".to_string()]);
}

#[test]
fn test_hidden_entries_are_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    touch(&root.join(".hidden.mkv"));
    touch(&root.join(".cache").join("ep01.mkv"));
    touch(&root.join(".cache").join("nested").join("ep02.mkv"));
    touch(&root.join("visible").join(".ep03.mkv"));
    touch(&root.join("visible").join("ep04.mkv"));

    let files = list_files(root, &default_exts()).unwrap();
    assert_eq!(files.as_slice(), &[rel(&["visible", "ep04.mkv"])]);
}

#[test]
fn test_hidden_root_is_still_scanned() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join(".downloads");
    touch(&root.join("ep01.mkv"));

    let files = list_files(&root, &default_exts()).unwrap();
    assert_eq!(files.len(), 1);
}

#[cfg(unix)]
#[test]
fn test_hard_links_are_listed_once() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    touch(&root.join("a.mkv"));
    fs::hard_link(root.join("a.mkv"), root.join("b.mkv")).unwrap();

    let files = list_files(root, &default_exts()).unwrap();
    assert_eq!(files.as_slice(), &["a.mkv".to_string()]);
}

#[cfg(unix)]
#[test]
fn test_symlink_cycle_terminates() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    touch(&root.join("show").join("ep01.mkv"));
    std::os::unix::fs::symlink(root, root.join("show").join("loop")).unwrap();

    let files = list_files(root, &default_exts()).unwrap();
    assert_eq!(files.as_slice(), &[rel(&["show", "ep01.mkv"])]);
}

#[test]
fn test_list_nonexistent_path() {
    let result = list_files(Path::new("/nonexistent/path"), &default_exts());
    assert!(result.is_err());
}

#[test]
fn test_list_file_instead_of_directory() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("a.mkv");
    touch(&file);
    assert!(list_files(&file, &default_exts()).is_err());
}

#[cfg(unix)]
#[test]
fn test_dangling_link_with_allowed_extension_fails() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    touch(&root.join("a.mkv"));
    std::os::unix::fs::symlink(root.join("missing.mkv"), root.join("b.mkv")).unwrap();

    let result = list_files(root, &default_exts());
    assert!(matches!(result, Err(Error::Walk(_))));
}

#[cfg(unix)]
#[test]
fn test_dangling_link_outside_listing_is_ignored() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    touch(&root.join("a.mkv"));
    std::os::unix::fs::symlink(root.join("missing.jpg"), root.join("cover.jpg")).unwrap();
    std::os::unix::fs::symlink(root.join("missing.mkv"), root.join(".partial.mkv")).unwrap();

    let files = list_files(root, &default_exts()).unwrap();
    assert_eq!(files.as_slice(), &["a.mkv".to_string()]);
}

#[cfg(unix)]
#[test]
fn test_non_utf8_names() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    touch(&root.join("a.mkv"));
    touch(&root.join(OsStr::from_bytes(b".\xff.mkv")));

    // A hidden name is skipped whatever its encoding.
    let files = list_files(root, &default_exts()).unwrap();
    assert_eq!(files.as_slice(), &["a.mkv".to_string()]);

    touch(&root.join(OsStr::from_bytes(b"\xff.mkv")));
    let result = list_files(root, &default_exts());
    assert!(matches!(result, Err(Error::NonUtf8Path(_))));
}
