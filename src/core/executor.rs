//! Plan executor module.
//!
//! Materializes a rename plan as links under the output directory. Original
//! files are never moved or modified.
//!
//! The whole plan is validated before the first link is created. If a link
//! still fails midway, the links created so far are removed again.

use crate::core::scanner::FileList;
use crate::models::plan::RenamePlan;
use crate::utils::fs::{entry_exists, hard_link, symlink_file};
use crate::{Error, Result};
use colored::Colorize;
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// How each destination refers to its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
    Symlink,
    Hardlink,
}

impl LinkMode {
    pub fn from_hardlink_flag(hardlink: bool) -> Self {
        if hardlink {
            LinkMode::Hardlink
        } else {
            LinkMode::Symlink
        }
    }
}

impl std::fmt::Display for LinkMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkMode::Symlink => write!(f, "symlink"),
            LinkMode::Hardlink => write!(f, "hardlink"),
        }
    }
}

/// One link to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOperation {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Result of applying a plan.
#[derive(Debug, Default)]
pub struct ApplyReport {
    /// Links created, in plan order.
    pub created: Vec<LinkOperation>,
}

/// Plan executor.
pub struct Executor {
    input_root: PathBuf,
    output_root: PathBuf,
    mode: LinkMode,
}

impl Executor {
    /// Create a new executor.
    ///
    /// A relative input root is made absolute so symlinks stay valid from
    /// anywhere in the output tree.
    pub fn new(input_root: &Path, output_root: &Path, mode: LinkMode) -> Result<Self> {
        let input_root = if input_root.is_absolute() {
            input_root.to_path_buf()
        } else {
            std::env::current_dir()?.join(input_root)
        };

        Ok(Self {
            input_root,
            output_root: output_root.to_path_buf(),
            mode,
        })
    }

    /// Check every entry and resolve it to a link operation.
    ///
    /// Fails on the first entry with an out-of-range index, a missing
    /// source, an existing destination, an unsafe destination name, or a
    /// destination already claimed by an earlier entry.
    pub fn validate(&self, files: &FileList, plan: &RenamePlan) -> Result<Vec<LinkOperation>> {
        let mut operations = Vec::with_capacity(plan.len());
        let mut claimed = HashSet::new();

        for entry in &plan.files {
            let original = files.get(entry.index).ok_or(Error::IndexOutOfRange {
                index: entry.index,
                len: files.len(),
            })?;

            let source = self.input_root.join(original);
            if !source.is_file() {
                return Err(Error::SourceNotFound(source.display().to_string()));
            }

            check_relative_name(&entry.name)?;
            let destination = self.output_root.join(&entry.name);
            if entry_exists(&destination) {
                return Err(Error::FileAlreadyExists(destination.display().to_string()));
            }
            if !claimed.insert(destination.clone()) {
                return Err(Error::InvalidPlan(format!(
                    "more than one file is renamed to {}",
                    entry.name
                )));
            }

            operations.push(LinkOperation {
                source,
                destination,
            });
        }

        Ok(operations)
    }

    /// Validate and apply a plan.
    pub fn apply(&self, files: &FileList, plan: &RenamePlan) -> Result<ApplyReport> {
        let operations = self.validate(files, plan)?;
        let mut report = ApplyReport::default();

        tracing::info!(
            "Creating {} {}s under {}",
            operations.len(),
            self.mode,
            self.output_root.display()
        );

        for op in operations {
            if let Err(e) = self.link(&op) {
                tracing::error!("Link failed: {} - {}", op.destination.display(), e);
                self.rollback(&report.created);
                return Err(e);
            }
            tracing::debug!("Linked {:?} -> {:?}", op.destination, op.source);
            report.created.push(op);
        }

        Ok(report)
    }

    fn link(&self, op: &LinkOperation) -> Result<()> {
        if let Some(parent) = op.destination.parent() {
            fs::create_dir_all(parent)?;
        }
        match self.mode {
            LinkMode::Hardlink => hard_link(&op.source, &op.destination),
            LinkMode::Symlink => symlink_file(&op.source, &op.destination),
        }
    }

    /// Remove links created earlier in this run. Directories are kept.
    fn rollback(&self, created: &[LinkOperation]) {
        if created.is_empty() {
            return;
        }
        println!(
            "{} removing {} links created before the failure",
            "[ROLLBACK]".bold().yellow(),
            created.len()
        );
        for op in created.iter().rev() {
            if let Err(e) = fs::remove_file(&op.destination) {
                tracing::warn!("Failed to remove {:?}: {}", op.destination, e);
            }
        }
    }
}

/// Reject destination names that would leave the output directory.
fn check_relative_name(name: &str) -> Result<()> {
    let path = Path::new(name);
    if name.is_empty() {
        return Err(Error::InvalidPlan("empty destination name".to_string()));
    }
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => {
                return Err(Error::InvalidPlan(format!(
                    "destination must be a relative path inside the output directory: {}",
                    name
                )))
            }
        }
    }
    Ok(())
}

/// Apply a plan (convenience function).
pub fn apply_plan(
    input_root: &Path,
    files: &FileList,
    plan: &RenamePlan,
    output_root: &Path,
    mode: LinkMode,
) -> Result<ApplyReport> {
    Executor::new(input_root, output_root, mode)?.apply(files, plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_mode_from_flag() {
        assert_eq!(LinkMode::from_hardlink_flag(true), LinkMode::Hardlink);
        assert_eq!(LinkMode::from_hardlink_flag(false), LinkMode::Symlink);
    }

    #[test]
    fn test_check_relative_name() {
        assert!(check_relative_name("Show (2020)/Season 01/S01E01.mkv").is_ok());
        assert!(check_relative_name("./Show/a.mkv").is_ok());
        assert!(check_relative_name("").is_err());
        assert!(check_relative_name("/etc/passwd").is_err());
        assert!(check_relative_name("Show/../../escape.mkv").is_err());
    }

    #[test]
    fn test_apply_empty_plan() {
        let executor = Executor::new(Path::new("in"), Path::new("out"), LinkMode::Symlink).unwrap();
        let report = executor
            .apply(&FileList::default(), &RenamePlan::default())
            .unwrap();
        assert!(report.created.is_empty());
    }

    // Filesystem tests live in tests/executor_tests.rs
}
