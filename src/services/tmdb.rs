//! TMDB API client.
//!
//! Only the two TV endpoints the renamer needs are covered. Responses are
//! kept as raw JSON so the model sees exactly what TMDB returned.

use crate::models::metadata::{
    select_seasons, validate_season_info, validate_series_info, SeasonInfo, SeriesMetadata,
};
use crate::{Error, Result};
use futures::future::try_join_all;
use serde_json::Value;

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

/// TMDB client configuration.
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    /// Bearer token (API read access token).
    pub api_key: String,
    /// Response language, forwarded as `language` on every request.
    pub language: Option<String>,
    /// Optional proxy URL.
    pub proxy: Option<String>,
}

/// TMDB API client.
pub struct TmdbClient {
    config: TmdbConfig,
    client: reqwest::Client,
    base_url: String,
}

impl TmdbClient {
    /// Create a new TMDB client.
    pub fn new(config: TmdbConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }
        let client = builder.build()?;

        Ok(Self {
            config,
            client,
            base_url: TMDB_BASE_URL.to_string(),
        })
    }

    /// Point the client at another host (mirrors, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Query parameters shared by every request.
    fn query(&self) -> Vec<(&'static str, String)> {
        self.config
            .language
            .iter()
            .map(|lang| ("language", lang.clone()))
            .collect()
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!("GET {}", url);

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .query(&self.query())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json().await?)
    }

    /// Get series-level info.
    pub async fn get_series_info(&self, tv_id: u64) -> Result<Value> {
        self.get_json(&format!("tv/{}", tv_id)).await
    }

    /// Get season detail including episodes.
    pub async fn get_season_info(&self, tv_id: u64, season_number: u32) -> Result<Value> {
        self.get_json(&format!("tv/{}/season/{}", tv_id, season_number))
            .await
    }

    /// Fetch series info and the detail of the selected seasons.
    ///
    /// Season requests run concurrently once the series info is in. Any
    /// failure aborts the whole fetch.
    pub async fn fetch_series_metadata(
        &self,
        tv_id: u64,
        season_filter: Option<u32>,
    ) -> Result<SeriesMetadata> {
        let series_info = self.get_series_info(tv_id).await?;
        let listed = validate_series_info(&series_info)?;
        let selected = select_seasons(&listed, season_filter);

        tracing::info!(
            "TMDB series {} lists {} seasons, fetching {:?}",
            tv_id,
            listed.len(),
            selected
        );

        let seasons = try_join_all(selected.iter().map(|&season_number| async move {
            let info = self.get_season_info(tv_id, season_number).await?;
            validate_season_info(season_number, &info)?;
            Ok::<_, Error>(SeasonInfo {
                season_number,
                info,
            })
        }))
        .await?;

        Ok(SeriesMetadata {
            series_info,
            seasons,
        })
    }
}
