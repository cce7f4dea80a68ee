//! Rename plan data model.
//!
//! The completion service never echoes full source paths back. It refers to
//! files by their position in the file list and answers with a new relative
//! name for each position.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// A file reference as exchanged with the completion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedFile {
    /// Zero-based position in the file list.
    pub index: usize,
    /// File name (relative path).
    pub name: String,
}

impl IndexedFile {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }
}

/// Proposed new name for each indexed file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamePlan {
    /// Plan entries, in the order the model produced them.
    pub files: Vec<IndexedFile>,
}

impl RenamePlan {
    pub fn new(files: Vec<IndexedFile>) -> Self {
        Self { files }
    }

    /// Number of entries in the plan.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// File list positions in `0..file_count` that no entry refers to.
    pub fn missing_indices(&self, file_count: usize) -> Vec<usize> {
        let covered: HashSet<usize> = self.files.iter().map(|f| f.index).collect();
        (0..file_count).filter(|i| !covered.contains(i)).collect()
    }
}

/// Validate a single `{index, name}` object.
///
/// `index` must be a non-negative JSON integer and `name` a JSON string.
/// No coercion is attempted: `"1"` or `1.0` is not an index. Unknown keys
/// are ignored.
pub fn validate_file(value: &Value) -> Result<IndexedFile> {
    let object = value
        .as_object()
        .ok_or_else(|| Error::InvalidPlan(format!("expected an object, got {}", kind(value))))?;

    let index = match object.get("index") {
        Some(v) => v.as_u64().ok_or_else(|| {
            Error::InvalidPlan(format!("`index` must be a non-negative integer, got {}", v))
        })?,
        None => return Err(Error::InvalidPlan("missing field `index`".to_string())),
    };
    let index = usize::try_from(index)
        .map_err(|_| Error::InvalidPlan(format!("`index` {} is too large", index)))?;

    let name = match object.get("name") {
        Some(Value::String(s)) => s.clone(),
        Some(v) => {
            return Err(Error::InvalidPlan(format!(
                "`name` must be a string, got {}",
                kind(v)
            )))
        }
        None => return Err(Error::InvalidPlan("missing field `name`".to_string())),
    };

    Ok(IndexedFile { index, name })
}

/// Validate a `{files: [...]}` payload.
pub fn validate_plan(value: &Value) -> Result<RenamePlan> {
    let files = value
        .get("files")
        .ok_or_else(|| Error::InvalidPlan("missing field `files`".to_string()))?
        .as_array()
        .ok_or_else(|| Error::InvalidPlan("`files` must be an array".to_string()))?;

    let files = files.iter().map(validate_file).collect::<Result<Vec<_>>>()?;
    Ok(RenamePlan { files })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
