//! Core business logic modules.

pub mod confirm;
pub mod executor;
pub mod pipeline;
pub mod prompt;
pub mod requester;
pub mod response;
pub mod scanner;
pub mod stream;
