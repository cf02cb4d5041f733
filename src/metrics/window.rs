//! Rolling windows of recent daily values with day-over-day changes.
//!
//! The change columns depend on state carried from one in-window record to the
//! next, so the walk is a fold over [`WindowState`]. The state starts at zero
//! for every country, which means the oldest row of a window never has changes.

use crate::domain::{CountryRefs, CountryWindow, DailyRecord, DayChange, TimeSeries, WindowRow};
use crate::error::AppError;

use super::{cmp_country, per_million};

/// Accumulator of the rolling-window walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowState {
    confirmed: u64,
    deaths: u64,
    recovered: u64,
    activated_at: Option<i64>,
}

impl WindowState {
    /// Day index of the first row that carried changes, if any.
    pub fn activated_at(&self) -> Option<i64> {
        self.activated_at
    }

    /// Consume one record; returns the next state and the record's changes.
    pub fn step(self, day_index: i64, record: &DailyRecord) -> (WindowState, Option<DayChange>) {
        let change = self.change_to(record);
        let next = WindowState {
            confirmed: record.confirmed,
            deaths: record.deaths,
            recovered: record.recovered,
            activated_at: self.activated_at.or(change.map(|_| day_index)),
        };
        (next, change)
    }

    fn change_to(&self, record: &DailyRecord) -> Option<DayChange> {
        if self.deaths < 1 {
            return None;
        }
        let recovered_factor = (self.recovered > 0).then(|| record.recovered as f64 / self.recovered as f64);
        Some(DayChange {
            confirmed: delta(record.confirmed, self.confirmed),
            deaths: delta(record.deaths, self.deaths),
            recovered: delta(record.recovered, self.recovered),
            deaths_factor: record.deaths as f64 / self.deaths as f64,
            recovered_factor,
        })
    }
}

/// Signed difference, saturating at the `i64` range.
fn delta(current: u64, previous: u64) -> i64 {
    if current >= previous {
        i64::try_from(current - previous).unwrap_or(i64::MAX)
    } else {
        i64::try_from(previous - current).map_or(i64::MIN, |d| -d)
    }
}

/// Rows of the last `days_past` records, oldest first, indexed `-(n-1)..=0`.
///
/// Sequences shorter than the window are used whole.
pub fn window_rows(records: &[DailyRecord], population: u64, days_past: usize) -> Vec<WindowRow> {
    let start = records.len().saturating_sub(days_past);
    let window = &records[start..];
    let newest = window.len() as i64 - 1;

    window
        .iter()
        .enumerate()
        .scan(WindowState::default(), |state, (pos, record)| {
            let day_index = pos as i64 - newest;
            let (next, change) = state.step(day_index, record);
            *state = next;
            Some(WindowRow {
                day_index,
                record: *record,
                per_million: per_million(record, population),
                change,
            })
        })
        .collect()
}

/// Reject window lengths of 1 day or less.
pub fn ensure_window_len(days_past: usize) -> Result<(), AppError> {
    if days_past <= 1 {
        return Err(AppError::invalid_argument(format!(
            "Rolling window needs more than 1 day, got {days_past}."
        )));
    }
    Ok(())
}

/// Rolling window of every curated country, sorted by name.
///
/// `days_past` must exceed 1. A curated country missing from the series is
/// `NotFound`; one without records is `InvalidData`.
pub fn rolling_window(
    series: &TimeSeries,
    refs: &CountryRefs,
    days_past: usize,
) -> Result<Vec<CountryWindow>, AppError> {
    ensure_window_len(days_past)?;

    let mut out = Vec::with_capacity(refs.len());
    for (country, reference) in refs {
        let records = series.records(country)?;
        if records.is_empty() {
            return Err(AppError::invalid_data(format!("Country '{country}' has no records.")));
        }
        out.push(CountryWindow {
            country: country.clone(),
            code: reference.code.clone(),
            rows: window_rows(records, reference.population, days_past),
        });
    }
    out.sort_by(|a, b| cmp_country(&a.country, &b.country));
    Ok(out)
}
