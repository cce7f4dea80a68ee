//! Shows Rename Library
//!
//! Renames TV show files into a `Series (Year)/Season XX/SXXEXX` layout by
//! asking an LLM for a rename plan, optionally backed by TMDB metadata, and
//! linking the originals into the output directory.

pub mod cli;
pub mod core;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use error::{Error, Result};
