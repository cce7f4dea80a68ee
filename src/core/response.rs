//! Free-text response parser.
//!
//! Models without schema-constrained output are asked to answer in the same
//! JSONL shape as the file list they were given. Each non-blank line outside
//! the code fences must be one `{"index": .., "name": ..}` object.

use crate::models::plan::{validate_file, RenamePlan};
use crate::{Error, Result};
use serde_json::Value;

/// Parse a JSONL answer into a plan.
///
/// Blank lines and fence lines (starting with three backticks) are ignored.
/// Any other line that is not valid JSON of the file shape fails the whole
/// parse with that line in the error. Entry order is kept.
pub fn parse_response(text: &str) -> Result<RenamePlan> {
    let mut files = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("```") {
            continue;
        }

        let value: Value = serde_json::from_str(line).map_err(|e| Error::ResponseParse {
            line: line.to_string(),
            reason: e.to_string(),
        })?;
        let file = validate_file(&value).map_err(|e| Error::ResponseParse {
            line: line.to_string(),
            reason: e.to_string(),
        })?;
        files.push(file);
    }

    Ok(RenamePlan::new(files))
}
