//! Shared domain types.
//!
//! Inputs (`DailyRecord`, `TimeSeries`, `CountryRef`) are produced once by the
//! data layer and only read afterwards. Report rows are plain values so they
//! can be rendered as TSV or as terminal tables without further lookups.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::AppError;

/// One day of cumulative counts for a single country.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub confirmed: u64,
    pub deaths: u64,
    pub recovered: u64,
}

/// Per-country daily records, each sequence sorted by date ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeSeries {
    countries: BTreeMap<String, Vec<DailyRecord>>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a country, sorting its records so the last one is the most recent.
    pub fn insert(&mut self, country: impl Into<String>, mut records: Vec<DailyRecord>) {
        records.sort_by_key(|r| r.date);
        self.countries.insert(country.into(), records);
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn countries(&self) -> impl Iterator<Item = (&str, &[DailyRecord])> {
        self.countries
            .iter()
            .map(|(name, records)| (name.as_str(), records.as_slice()))
    }

    /// Records of a country; a missing country is a `NotFound` error.
    pub fn records(&self, country: &str) -> Result<&[DailyRecord], AppError> {
        self.countries
            .get(country)
            .map(Vec::as_slice)
            .ok_or_else(|| AppError::not_found(format!("Country '{country}' is missing from the time series.")))
    }

    /// Most recent record of a country.
    ///
    /// Fails with `NotFound` for an unknown country and `InvalidData` for an
    /// empty sequence.
    pub fn latest(&self, country: &str) -> Result<&DailyRecord, AppError> {
        latest_record(country, self.records(country)?)
    }
}

pub(crate) fn latest_record<'a>(country: &str, records: &'a [DailyRecord]) -> Result<&'a DailyRecord, AppError> {
    records
        .last()
        .ok_or_else(|| AppError::invalid_data(format!("Country '{country}' has no records.")))
}

/// Reference metadata of a curated country.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryRef {
    pub code: String,
    pub population: u64,
    pub pop_density: f64,
    pub gdp_per_capita: f64,
}

/// Curated countries keyed by the name used in the time series.
pub type CountryRefs = BTreeMap<String, CountryRef>;

/// Per-million normalization of the three counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerMillion {
    pub confirmed: f64,
    pub deaths: f64,
    pub recovered: f64,
}

/// Row of the latest-snapshot report covering every country.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestRow {
    pub country: String,
    pub record: DailyRecord,
}

/// Row of the latest-snapshot report for curated countries.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedRow {
    pub country: String,
    pub record: DailyRecord,
    /// Absent when the population is zero.
    pub per_million: Option<PerMillion>,
}

/// Country outside the curated set whose latest counts pass a threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotspotRow {
    pub country: String,
    pub confirmed: u64,
    pub deaths: u64,
}

/// Day-over-day changes against the previous in-window record.
///
/// Only present once the previous record carries at least one death.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayChange {
    pub confirmed: i64,
    pub deaths: i64,
    pub recovered: i64,
    pub deaths_factor: f64,
    /// Present only when the previous recovered count is non-zero.
    pub recovered_factor: Option<f64>,
}

/// One day of a country's rolling window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowRow {
    /// 0 for the most recent record, negative for older ones.
    pub day_index: i64,
    pub record: DailyRecord,
    pub per_million: Option<PerMillion>,
    pub change: Option<DayChange>,
}

/// Rolling window of one curated country.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryWindow {
    pub country: String,
    pub code: String,
    pub rows: Vec<WindowRow>,
}

/// Thresholds for the unlisted-hotspot check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotspotThresholds {
    pub min_confirmed: u64,
    pub min_deaths: u64,
}

impl Default for HotspotThresholds {
    fn default() -> Self {
        Self {
            min_confirmed: 1000,
            min_deaths: 10,
        }
    }
}

/// Fully resolved options of a run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub data_dir: PathBuf,
    pub refs_path: PathBuf,
    pub offline: bool,
    pub days_past: usize,
    pub thresholds: HotspotThresholds,
    pub reference_country: Option<String>,
}

impl RunConfig {
    /// Cache file holding the downloaded JSON.
    pub fn download_path(&self) -> PathBuf {
        self.data_dir.join("download-countries-timeseries.json")
    }
}
