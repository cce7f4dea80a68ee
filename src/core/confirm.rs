//! Confirmation step before touching the filesystem.

use crate::Result;
use async_trait::async_trait;
use colored::Colorize;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;

/// Decides whether a displayed plan gets applied.
#[async_trait]
pub trait Confirmation: Send + Sync {
    async fn confirm(&self, question: &str) -> Result<bool>;
}

/// Always says yes. Used with `--yes` and in non-interactive runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoConfirm;

#[async_trait]
impl Confirmation for AutoConfirm {
    async fn confirm(&self, _question: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Asks on the terminal and reads one line of input.
///
/// `n` or `no` (any case) and end of input decline; anything else,
/// including an empty line, accepts.
pub struct PromptConfirm<R> {
    reader: Mutex<R>,
}

impl PromptConfirm<BufReader<tokio::io::Stdin>> {
    /// Read answers from stdin.
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> PromptConfirm<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader: Mutex::new(reader),
        }
    }
}

/// Interpret an answer line.
fn is_accepted(answer: &str) -> bool {
    let answer = answer.trim();
    !(answer.eq_ignore_ascii_case("n") || answer.eq_ignore_ascii_case("no"))
}

#[async_trait]
impl<R> Confirmation for PromptConfirm<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn confirm(&self, question: &str) -> Result<bool> {
        print!("{} {} ", question.bold(), "[Y/n]".dimmed());
        std::io::stdout().flush()?;

        let mut line = String::new();
        let read = self.reader.lock().await.read_line(&mut line).await?;
        if read == 0 {
            println!();
            return Ok(false);
        }
        Ok(is_accepted(&line))
    }
}
