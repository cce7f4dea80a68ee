//! Series metadata model.
//!
//! TMDB payloads are kept as raw JSON: they are only forwarded to the model,
//! never interpreted beyond the season listing.

use crate::{Error, Result};
use serde_json::Value;

/// Season number TMDB uses for specials.
pub const SPECIALS_SEASON: u32 = 0;

/// Series-level info plus per-season detail.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesMetadata {
    /// Series info blob (`/tv/{id}`).
    pub series_info: Value,
    /// Season detail blobs in series-listing order.
    pub seasons: Vec<SeasonInfo>,
}

/// Detail for one season (`/tv/{id}/season/{n}`).
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonInfo {
    pub season_number: u32,
    pub info: Value,
}

/// Validate a series info blob and return the season numbers it lists.
///
/// The blob must be an object with a `seasons` array whose entries carry a
/// non-negative integer `season_number`.
pub fn validate_series_info(series_info: &Value) -> Result<Vec<u32>> {
    let object = series_info
        .as_object()
        .ok_or_else(|| Error::InvalidMetadata("series info is not an object".to_string()))?;

    let seasons = object
        .get("seasons")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::InvalidMetadata("series info has no `seasons` list".to_string()))?;

    seasons
        .iter()
        .map(|season| {
            season
                .get("season_number")
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| {
                    Error::InvalidMetadata(format!("season entry without a valid season_number: {}", season))
                })
        })
        .collect()
}

/// Validate a season info blob.
pub fn validate_season_info(season_number: u32, info: &Value) -> Result<()> {
    if info.is_object() {
        Ok(())
    } else {
        Err(Error::InvalidMetadata(format!(
            "season {} info is not an object",
            season_number
        )))
    }
}

/// Pick the seasons to fetch detail for.
///
/// Without a filter every listed season is selected. With a filter only the
/// filtered season and the specials season are kept. Listing order is
/// preserved.
pub fn select_seasons(listed: &[u32], filter: Option<u32>) -> Vec<u32> {
    match filter {
        None => listed.to_vec(),
        Some(wanted) => listed
            .iter()
            .copied()
            .filter(|&n| n == SPECIALS_SEASON || n == wanted)
            .collect(),
    }
}
