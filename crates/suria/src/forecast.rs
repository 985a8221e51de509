//! Forecast feed wire types, fetch client, and latest-record selection.
//!
//! The public feed returns every known forecast as one list; all filtering
//! happens on our side. Records are immutable once fetched and live only for
//! the request that fetched them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::weather::{self, OutputTier, WeatherCategory};

// ── Wire types ──────────────────────────────────────────────────────

/// Forecast site as reported by the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub location_id: String,
    pub location_name: String,
}

/// One day of forecast for one location, as returned by the feed.
///
/// `summary_forecast` doubles as the evening daypart. `summary_when`,
/// `min_temp` and `max_temp` are passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub location: Location,
    /// ISO `YYYY-MM-DD`.
    pub date: String,
    pub morning_forecast: String,
    pub afternoon_forecast: String,
    pub summary_forecast: String,
    pub night_forecast: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_when: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_temp: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_temp: Option<i32>,
}

/// Category and tier projection for one daypart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaypartOutlook {
    pub daypart: String,
    pub description: String,
    pub category: WeatherCategory,
    pub tier: OutputTier,
}

/// Per-daypart outlook for a full record.
pub fn outlook(record: &ForecastRecord) -> Vec<DaypartOutlook> {
    [
        ("morning", &record.morning_forecast),
        ("afternoon", &record.afternoon_forecast),
        ("evening", &record.summary_forecast),
        ("night", &record.night_forecast),
    ]
    .into_iter()
    .map(|(daypart, description)| {
        let category = weather::classify(description);
        DaypartOutlook {
            daypart: daypart.to_string(),
            description: description.clone(),
            category,
            tier: weather::output_tier(category),
        }
    })
    .collect()
}

// ── Selection ───────────────────────────────────────────────────────

/// Pick the most recent record for a location (case-insensitive match).
///
/// Orders by parsed date with feed order breaking ties; records with
/// unparseable dates sort first. `None` means no data yet, not an error.
pub fn select_latest<'a>(
    records: &'a [ForecastRecord],
    location_name: &str,
) -> Option<&'a ForecastRecord> {
    let wanted = location_name.to_lowercase();
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.location.location_name.to_lowercase() == wanted)
        .max_by_key(|(idx, r)| (NaiveDate::parse_from_str(&r.date, "%Y-%m-%d").ok(), *idx))
        .map(|(_, r)| r)
}

// ── Feed client ─────────────────────────────────────────────────────

/// Errors from the forecast feed.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("feed error (status {status}): {message}")]
    Upstream { status: u16, message: String },
}

/// Client for the public weather forecast feed.
#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: reqwest::Client,
    url: String,
}

impl ForecastClient {
    /// Create a client for the feed at `url` with a per-request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Fetch the full forecast data set, unfiltered.
    ///
    /// Upstream failures are not retried; the caller surfaces them as a
    /// structured error response.
    pub async fn fetch_all(&self) -> Result<Vec<ForecastRecord>, FeedError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(FeedError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

// ── Tests ───────────────────────────────────────────────────────────
