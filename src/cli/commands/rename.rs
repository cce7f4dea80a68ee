//! Rename command implementation.
//!
//! Resolves configuration, gathers TMDB metadata when enabled, builds the
//! completion client and runs the pipeline.

use crate::cli::args::Cli;
use crate::core::confirm::{AutoConfirm, Confirmation, PromptConfirm};
use crate::core::pipeline::{Outcome, Pipeline};
use crate::core::requester::requester_for;
use crate::models::config::Config;
use crate::models::metadata::SeriesMetadata;
use crate::services::openai::{CompletionClient, CompletionConfig};
use crate::services::tmdb::{TmdbClient, TmdbConfig};
use crate::utils::fs::ensure_directory;
use crate::Result;
use colored::Colorize;

/// Execute the rename command.
pub async fn rename(cli: &Cli) -> Result<()> {
    // Credentials are checked before anything touches the network.
    let config = Config::load(cli)?;
    ensure_directory(&config.input)?;

    println!("{}", "📺 Renaming shows...".bold().cyan());
    println!();
    println!("  {} {}", "Input:".bold(), config.input.display());
    println!("  {} {}", "Output:".bold(), config.output.display());
    println!("  {} {}", "Model:".bold(), config.model);
    println!(
        "  {} {}",
        "Links:".bold(),
        if config.hardlink { "hardlink" } else { "symlink" }
    );
    println!();

    let metadata = fetch_metadata(&config).await?;

    let client = CompletionClient::new(CompletionConfig {
        api_key: config.api_key.clone(),
        base_url: config.base_url.clone(),
        proxy: config.proxy.clone(),
        model: config.model.clone(),
    })?;
    let requester = requester_for(client);

    let confirmation: Box<dyn Confirmation> = if config.assume_yes {
        Box::new(AutoConfirm)
    } else {
        Box::new(PromptConfirm::stdin())
    };

    let pipeline = Pipeline::new(&config, requester.as_ref(), confirmation.as_ref());
    match pipeline.run(metadata.as_ref()).await? {
        Outcome::NoFiles | Outcome::Cancelled(_) => {}
        Outcome::Applied { report, .. } => {
            tracing::info!("Applied {} links", report.created.len());
        }
    }

    Ok(())
}

/// Fetch TMDB metadata when an ID and API key are both configured.
async fn fetch_metadata(config: &Config) -> Result<Option<SeriesMetadata>> {
    if !config.metadata_enabled() {
        if config.tmdb_id.is_some() && !config.no_tmdb {
            tracing::info!("No TMDB API key configured, skipping TMDB lookup");
        }
        return Ok(None);
    }

    let (Some(tv_id), Some(api_key)) = (config.tmdb_id, config.tmdb_api_key.clone()) else {
        return Ok(None);
    };

    println!("{}", "[TMDB] Fetching series info...".bold().cyan());
    let client = TmdbClient::new(TmdbConfig {
        api_key,
        language: config.tmdb_language.clone(),
        proxy: config.proxy.clone(),
    })?;
    let metadata = client
        .fetch_series_metadata(tv_id, config.season_number)
        .await?;

    println!(
        "  {} {} seasons loaded",
        "[OK]".green(),
        metadata.seasons.len()
    );
    println!();

    Ok(Some(metadata))
}
