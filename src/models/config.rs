//! Configuration model.
//!
//! Values come from the command line first and the YAML config file second,
//! with built-in defaults for the rest.

use crate::cli::args::Cli;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default completion service endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Extensions processed when neither the CLI nor the config file names any.
pub const DEFAULT_EXTS: &[&str] = &[".mp4", ".mkv", ".ass", ".srt"];

/// Contents of the YAML config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct YamlConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub proxy: Option<String>,
    pub model: Option<String>,
    pub tmdb_api_key: Option<String>,
    pub tmdb_language: Option<String>,
    pub exts: Option<YamlExts>,
}

/// `exts` may be a `;`-separated string or a list. Any other value is
/// accepted and ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum YamlExts {
    Joined(String),
    List(Vec<serde_yaml::Value>),
    Other(serde_yaml::Value),
}

impl YamlExts {
    /// Flatten to a list of extensions. Non-string list entries are skipped.
    ///
    /// Returns `None` for a value of any other shape.
    pub fn to_list(&self) -> Option<Vec<String>> {
        match self {
            YamlExts::Joined(s) => Some(s.split(';').map(str::to_string).collect()),
            YamlExts::List(values) => Some(
                values
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            ),
            YamlExts::Other(value) => {
                tracing::warn!("Ignoring exts value {:?} in config file", value);
                None
            }
        }
    }
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: String,
    pub proxy: Option<String>,
    pub model: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub hardlink: bool,
    pub series_name: Option<String>,
    pub year: Option<u32>,
    pub tmdb_api_key: Option<String>,
    pub tmdb_language: Option<String>,
    pub tmdb_id: Option<u64>,
    pub tvdb_id: Option<u64>,
    pub no_tmdb: bool,
    pub season_number: Option<u32>,
    pub exts: Vec<String>,
    /// Skip the confirmation prompt.
    pub assume_yes: bool,
}

impl Config {
    /// Merge command line arguments over the YAML config.
    ///
    /// Fails with [`Error::ApiKeyMissing`] when neither source has an API key.
    pub fn resolve(cli: &Cli, yaml: YamlConfig) -> Result<Self> {
        let api_key = cli
            .api_key
            .clone()
            .or(yaml.api_key)
            .filter(|k| !k.is_empty())
            .ok_or(Error::ApiKeyMissing)?;

        let exts = if !cli.exts.is_empty() {
            cli.exts.clone()
        } else {
            yaml.exts
                .and_then(|exts| exts.to_list())
                .unwrap_or_else(|| DEFAULT_EXTS.iter().map(|e| e.to_string()).collect())
        };

        Ok(Self {
            api_key,
            base_url: cli
                .base_url
                .clone()
                .or(yaml.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            proxy: cli.proxy.clone().or(yaml.proxy),
            model: cli
                .model
                .clone()
                .or(yaml.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            input: cli.input.clone(),
            output: cli.output.clone(),
            hardlink: cli.hardlink,
            series_name: cli.series_name.clone(),
            year: cli.year,
            tmdb_api_key: cli.tmdb_api_key.clone().or(yaml.tmdb_api_key),
            tmdb_language: cli.tmdb_language.clone().or(yaml.tmdb_language),
            tmdb_id: cli.tmdb_id,
            tvdb_id: cli.tvdb_id,
            no_tmdb: cli.no_tmdb,
            season_number: cli.season_number,
            exts,
            assume_yes: cli.yes,
        })
    }

    /// Load the config file named on the command line and merge it.
    pub fn load(cli: &Cli) -> Result<Self> {
        let yaml = load_yaml_config(&cli.config)?;
        Self::resolve(cli, yaml)
    }

    /// Whether TMDB metadata should be fetched for this run.
    pub fn metadata_enabled(&self) -> bool {
        !self.no_tmdb && self.tmdb_id.is_some() && self.tmdb_api_key.is_some()
    }
}

/// Read a YAML config file.
///
/// A missing file, an empty file, or a null document gives empty defaults.
pub fn load_yaml_config(path: &Path) -> Result<YamlConfig> {
    if !path.exists() {
        tracing::debug!("Config file {:?} not found, using defaults", path);
        return Ok(YamlConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    parse_yaml_config(&content)
}

/// Parse YAML config text.
pub fn parse_yaml_config(content: &str) -> Result<YamlConfig> {
    if content.trim().is_empty() {
        return Ok(YamlConfig::default());
    }
    let config: Option<YamlConfig> = serde_yaml::from_str(content)?;
    Ok(config.unwrap_or_default())
}
