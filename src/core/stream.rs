//! Streamed answer accumulator.
//!
//! Tracks one completion stream through its states:
//!
//! - `Receiving`: content is being appended.
//! - `Refused`: the model started a refusal; later refusal text is appended.
//! - `Completed`: the stream drained normally.
//! - `Failed`: the service reported an error mid-stream.
//!
//! Turning a completed stream into a plan depends on the response mode.

use crate::core::response::parse_response;
use crate::models::plan::{validate_plan, RenamePlan};
use crate::services::openai::Fragment;
use crate::{Error, Result};
use serde_json::Value;

/// How the answer text is turned into a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// Schema-constrained JSON `{files: [...]}`.
    Structured,
    /// Free-text JSONL, one file per line.
    Freeform,
}

/// Stream state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamState {
    Receiving,
    Refused,
    Completed,
    Failed(String),
}

/// Accumulates fragments of one stream.
#[derive(Debug)]
pub struct StreamAccumulator {
    mode: ResponseMode,
    state: StreamState,
    content: String,
    refusal: String,
}

impl StreamAccumulator {
    pub fn new(mode: ResponseMode) -> Self {
        Self {
            mode,
            state: StreamState::Receiving,
            content: String::new(),
            refusal: String::new(),
        }
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }

    /// Accumulated answer text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Apply one fragment.
    ///
    /// Returns the text to echo to the operator, if any. Fragments arriving
    /// after the stream completed or failed are ignored.
    pub fn accept(&mut self, fragment: Fragment) -> Option<String> {
        if matches!(self.state, StreamState::Completed | StreamState::Failed(_)) {
            return None;
        }

        match fragment {
            // Content after a refusal began is not part of any answer.
            Fragment::Content(_) if self.state == StreamState::Refused => None,
            Fragment::Content(text) => {
                self.content.push_str(&text);
                Some(text)
            }
            Fragment::Refusal(text) => {
                self.state = StreamState::Refused;
                self.refusal.push_str(&text);
                Some(text)
            }
            Fragment::Error(message) => {
                self.state = StreamState::Failed(message);
                None
            }
            Fragment::Done => {
                if self.state == StreamState::Receiving {
                    self.state = StreamState::Completed;
                }
                None
            }
        }
    }

    /// Turn the finished stream into a plan.
    pub fn finish(self) -> Result<RenamePlan> {
        match self.state {
            StreamState::Refused => Err(Error::ModelRefused(self.refusal)),
            StreamState::Failed(message) => Err(Error::StreamFailed(message)),
            StreamState::Receiving => Err(Error::StreamFailed(format!(
                "stream ended before completion: {}",
                self.content
            ))),
            StreamState::Completed => match self.mode {
                ResponseMode::Structured => parse_structured(&self.content),
                ResponseMode::Freeform => parse_response(&self.content),
            },
        }
    }
}

/// Parse a structured answer. Anything short of a valid plan object is
/// reported with the raw text.
fn parse_structured(content: &str) -> Result<RenamePlan> {
    if content.trim().is_empty() {
        return Err(Error::EmptyResponse(content.to_string()));
    }
    let value: Value =
        serde_json::from_str(content).map_err(|_| Error::EmptyResponse(content.to_string()))?;
    validate_plan(&value).map_err(|_| Error::EmptyResponse(content.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::plan::IndexedFile;

    fn content(s: &str) -> Fragment {
        Fragment::Content(s.to_string())
    }

    #[test]
    fn test_structured_completion() {
        let mut acc = StreamAccumulator::new(ResponseMode::Structured);
        assert_eq!(acc.accept(content("{\"files\":[{\"index\":0,")).as_deref(), Some("{\"files\":[{\"index\":0,"));
        acc.accept(content("\"name\":\"X (2020)/Season 01/S01E01.mkv\"}]}"));
        acc.accept(Fragment::Done);
        assert_eq!(acc.state(), &StreamState::Completed);

        let plan = acc.finish().unwrap();
        assert_eq!(plan.files, vec![IndexedFile::new(0, "X (2020)/Season 01/S01E01.mkv")]);
    }

    #[test]
    fn test_freeform_completion() {
        let mut acc = StreamAccumulator::new(ResponseMode::Freeform);
        acc.accept(content("```jsonl\n{\"index\":0,\"name\":\"a\"}\n"));
        acc.accept(content("{\"index\":1,\"name\":\"b\"}\n```"));
        acc.accept(Fragment::Done);

        let plan = acc.finish().unwrap();
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn test_refusal() {
        let mut acc = StreamAccumulator::new(ResponseMode::Structured);
        assert_eq!(acc.accept(Fragment::Refusal("I can't ".to_string())).as_deref(), Some("I can't "));
        acc.accept(Fragment::Refusal("help.".to_string()));
        acc.accept(Fragment::Done);
        assert_eq!(acc.state(), &StreamState::Refused);

        match acc.finish() {
            Err(Error::ModelRefused(text)) => assert_eq!(text, "I can't help."),
            other => panic!("expected refusal, got {:?}", other),
        }
    }

    #[test]
    fn test_structured_empty_result_carries_raw_text() {
        let mut acc = StreamAccumulator::new(ResponseMode::Structured);
        acc.accept(content("{\"files\": [trunc"));
        acc.accept(Fragment::Done);

        match acc.finish() {
            Err(Error::EmptyResponse(raw)) => assert_eq!(raw, "{\"files\": [trunc"),
            other => panic!("expected empty result, got {:?}", other),
        }

        let mut acc = StreamAccumulator::new(ResponseMode::Structured);
        acc.accept(Fragment::Done);
        assert!(matches!(acc.finish(), Err(Error::EmptyResponse(_))));
    }

    #[test]
    fn test_stream_error() {
        let mut acc = StreamAccumulator::new(ResponseMode::Freeform);
        acc.accept(content("{\"index\":0"));
        acc.accept(Fragment::Error("overloaded".to_string()));
        assert!(acc.accept(content("ignored")).is_none());
        assert!(matches!(acc.finish(), Err(Error::StreamFailed(m)) if m == "overloaded"));
    }

    #[test]
    fn test_not_drained() {
        let mut acc = StreamAccumulator::new(ResponseMode::Freeform);
        acc.accept(content("{\"index\":0,\"name\":\"a\"}"));
        assert!(matches!(acc.finish(), Err(Error::StreamFailed(_))));
    }

    #[test]
    fn test_fragments_after_completion_are_ignored() {
        let mut acc = StreamAccumulator::new(ResponseMode::Freeform);
        acc.accept(Fragment::Done);
        assert!(acc.accept(content("late")).is_none());
        assert_eq!(acc.content(), "");
    }
}
