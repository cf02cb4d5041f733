//! Download and parsing of the per-country time series.
//!
//! The upstream file is a single JSON object:
//!
//! ```text
//! { "Germany": [ { "date": "2020-1-22", "confirmed": 0, "deaths": 0, "recovered": 0 }, ... ], ... }
//! ```
//!
//! Month and day are not zero-padded upstream, so dates are split by hand
//! rather than parsed with a fixed format string.

use std::collections::BTreeMap;
use std::fs::{File, create_dir_all};
use std::io::BufReader;
use std::path::Path;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::info;

use crate::domain::{DailyRecord, TimeSeries};
use crate::error::AppError;

pub const DEFAULT_SERIES_URL: &str = "https://pomber.github.io/covid19/timeseries.json";
pub const SERIES_URL_ENV: &str = "TRENDS_SERIES_URL";

pub struct SeriesClient {
    client: Client,
    url: String,
}

impl SeriesClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }

    /// Build a client from `.env` / the process environment.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let url = std::env::var(SERIES_URL_ENV).unwrap_or_else(|_| DEFAULT_SERIES_URL.to_string());
        Self::new(url)
    }

    /// Download the dataset and store the body verbatim at `path`.
    ///
    /// Returns the number of bytes written.
    pub fn download(&self, path: &Path) -> Result<usize, AppError> {
        info!(url = %self.url, "downloading time series");
        let resp = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| AppError::fetch(format!("Time series request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::fetch(format!(
                "Time series request failed with status {}.",
                resp.status()
            )));
        }

        let body = resp
            .bytes()
            .map_err(|e| AppError::fetch(format!("Failed to read time series response: {e}")))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir_all(parent)
                .map_err(|e| AppError::io(format!("Failed to create '{}': {e}", parent.display())))?;
        }
        std::fs::write(path, &body)
            .map_err(|e| AppError::io(format!("Failed to write '{}': {e}", path.display())))?;

        info!(path = %path.display(), bytes = body.len(), "time series cached");
        Ok(body.len())
    }
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    date: String,
    #[serde(default)]
    confirmed: Option<u64>,
    #[serde(default)]
    deaths: Option<u64>,
    #[serde(default)]
    recovered: Option<u64>,
}

type RawSeries = BTreeMap<String, Vec<RawRecord>>;

/// Read a cached time series file.
pub fn read_series_json(path: &Path) -> Result<TimeSeries, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open time series '{}': {e}", path.display())))?;
    let raw: RawSeries = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::invalid_data(format!("Invalid time series JSON '{}': {e}", path.display())))?;
    convert(raw)
}

/// Parse a time series from a JSON string.
pub fn parse_series_json(json: &str) -> Result<TimeSeries, AppError> {
    let raw: RawSeries = serde_json::from_str(json)
        .map_err(|e| AppError::invalid_data(format!("Invalid time series JSON: {e}")))?;
    convert(raw)
}

fn convert(raw: RawSeries) -> Result<TimeSeries, AppError> {
    let mut series = TimeSeries::new();
    for (country, entries) in raw {
        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            let date = parse_dataset_date(&entry.date).ok_or_else(|| {
                AppError::invalid_data(format!("Invalid date '{}' for country '{country}'.", entry.date))
            })?;
            records.push(DailyRecord {
                date,
                confirmed: entry.confirmed.unwrap_or(0),
                deaths: entry.deaths.unwrap_or(0),
                recovered: entry.recovered.unwrap_or(0),
            });
        }
        series.insert(country, records);
    }
    Ok(series)
}

/// Parse `year-month-day` with optional zero padding.
pub fn parse_dataset_date(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.trim().split('-');
    let year = parts.next()?.parse::<i32>().ok()?;
    let month = parts.next()?.parse::<u32>().ok()?;
    let day = parts.next()?.parse::<u32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn parses_padded_and_unpadded_dates() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 5).unwrap();
        assert_eq!(parse_dataset_date("2021-03-05"), Some(expected));
        assert_eq!(parse_dataset_date("2021-3-5"), Some(expected));
        assert_eq!(parse_dataset_date("2021-2-30"), None);
        assert_eq!(parse_dataset_date("2021-03"), None);
        assert_eq!(parse_dataset_date("2021-03-05-01"), None);
        assert_eq!(parse_dataset_date("05.03.2021"), None);
    }

    #[test]
    fn parse_series_sorts_and_defaults_missing_counts() {
        let json = r#"{
            "Germany": [
                {"date": "2020-1-23", "confirmed": 5, "deaths": 1, "recovered": null},
                {"date": "2020-1-22", "confirmed": 2, "deaths": 0, "recovered": 0}
            ],
            "Chad": [
                {"date": "2020-1-22", "confirmed": 0, "deaths": 0}
            ]
        }"#;
        let series = parse_series_json(json).unwrap();
        assert_eq!(series.len(), 2);

        let germany = series.records("Germany").unwrap();
        assert_eq!(germany[0].date, NaiveDate::from_ymd_opt(2020, 1, 22).unwrap());
        let latest = series.latest("Germany").unwrap();
        assert_eq!(latest.confirmed, 5);
        assert_eq!(latest.recovered, 0);
        assert_eq!(series.latest("Chad").unwrap().recovered, 0);
    }

    #[test]
    fn bad_date_names_the_country() {
        let json = r#"{"Peru": [{"date": "yesterday", "confirmed": 1, "deaths": 0, "recovered": 0}]}"#;
        let err = parse_series_json(json).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
        assert!(err.to_string().contains("Peru"));
    }

    #[test]
    fn malformed_json_is_invalid_data() {
        let err = parse_series_json("[1, 2, 3]").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }
}
