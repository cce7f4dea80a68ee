//! Command line argument definitions.

use clap::Parser;
use std::path::PathBuf;

/// Shows Rename - Rename TV show files into a library layout with an LLM
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "shows-rename")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input directory
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// API key for the completion service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL for the completion service
    #[arg(long)]
    pub base_url: Option<String>,

    /// Proxy URL
    #[arg(short, long)]
    pub proxy: Option<String>,

    /// Model to use (default: gpt-4o-mini)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Path to the configuration file
    #[arg(short, long, default_value = "./config.yml")]
    pub config: PathBuf,

    /// Series name
    #[arg(short, long)]
    pub series_name: Option<String>,

    /// Year of the series
    #[arg(short = 'Y', long)]
    pub year: Option<u32>,

    /// TMDB API key
    #[arg(long, env = "TMDB_API_KEY", hide_env_values = true)]
    pub tmdb_api_key: Option<String>,

    /// TMDB language (e.g. en-US, zh-CN)
    #[arg(long)]
    pub tmdb_language: Option<String>,

    /// TMDB ID
    #[arg(short, long)]
    pub tmdb_id: Option<u64>,

    /// TVDB ID
    #[arg(short = 'T', long)]
    pub tvdb_id: Option<u64>,

    /// Use hardlinks instead of symlinks
    #[arg(short = 'H', long)]
    pub hardlink: bool,

    /// Do not use the TMDB API to obtain data
    #[arg(short, long)]
    pub no_tmdb: bool,

    /// Season number
    #[arg(short = 'S', long)]
    pub season_number: Option<u32>,

    /// File extensions to process, including the dot (repeatable)
    #[arg(short, long = "exts", value_name = "EXT")]
    pub exts: Vec<String>,

    /// Apply the plan without asking for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_short_flags() {
        let cli = Cli::try_parse_from([
            "shows-rename", "-m", "gpt-4o", "-s", "Show", "-Y", "2020", "-t", "42", "-T", "7",
            "-H", "-n", "-S", "2", "-e", ".mkv", "-e", ".ass", "-y", "in", "out",
        ])
        .unwrap();

        assert_eq!(cli.input, PathBuf::from("in"));
        assert_eq!(cli.output, PathBuf::from("out"));
        assert_eq!(cli.model.as_deref(), Some("gpt-4o"));
        assert_eq!(cli.series_name.as_deref(), Some("Show"));
        assert_eq!(cli.year, Some(2020));
        assert_eq!(cli.tmdb_id, Some(42));
        assert_eq!(cli.tvdb_id, Some(7));
        assert!(cli.hardlink);
        assert!(cli.no_tmdb);
        assert_eq!(cli.season_number, Some(2));
        assert_eq!(cli.exts, vec![".mkv", ".ass"]);
        assert!(cli.yes);
        assert_eq!(cli.config, PathBuf::from("./config.yml"));
    }

    #[test]
    fn test_options_after_positionals() {
        let cli = Cli::try_parse_from(["shows-rename", "in", "out", "--hardlink"]).unwrap();
        assert!(cli.hardlink);
    }

    #[test]
    fn test_missing_output_is_rejected() {
        assert!(Cli::try_parse_from(["shows-rename", "in"]).is_err());
    }
}
