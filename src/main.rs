//! Shows Rename CLI
//!
//! A command-line tool for renaming TV show files using an LLM and TMDB.

use clap::Parser;
use shows_rename::cli::{args::Cli, commands::rename};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    rename::rename(&cli).await?;

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("shows_rename=debug")
    } else {
        EnvFilter::new("shows_rename=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
