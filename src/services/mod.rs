//! External service clients.

pub mod openai;
pub mod tmdb;
