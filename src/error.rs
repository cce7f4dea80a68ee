//! Error types for the shows renamer.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the shows renamer.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("API key is required. Pass --api-key, set OPENAI_API_KEY or add api_key to the config file")]
    ApiKeyMissing,

    // File system errors
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Source file not found: {0}")]
    SourceNotFound(String),

    #[error("File already exists: {0}")]
    FileAlreadyExists(String),

    #[error("File name is not valid UTF-8: {0}")]
    NonUtf8Path(String),

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    // Completion service errors
    #[error("Model refused to answer: {0}")]
    ModelRefused(String),

    #[error("Model returned no usable result: {0}")]
    EmptyResponse(String),

    #[error("Failed to parse message: {line} ({reason})")]
    ResponseParse { line: String, reason: String },

    #[error("Completion stream failed: {0}")]
    StreamFailed(String),

    #[error("Service returned {status}: {message}")]
    Api { status: u16, message: String },

    // Metadata errors
    #[error("Invalid TMDB data: {0}")]
    InvalidMetadata(String),

    // Plan errors
    #[error("Invalid rename plan: {0}")]
    InvalidPlan(String),

    #[error("Plan index {index} is out of range for {len} files")]
    IndexOutOfRange { index: usize, len: usize },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // YAML errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
