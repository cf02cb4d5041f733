//! Derived metrics over the time series.
//!
//! - latest snapshots and the unlisted-hotspot check (`latest`)
//! - per-country rolling windows with day-over-day changes (`window`)
//!
//! Everything here is pure: inputs are borrowed, rows are returned, and
//! rendering is left to `report` and `io`.

use std::cmp::Ordering;

use crate::domain::{DailyRecord, PerMillion};

pub mod latest;
pub mod window;

pub use latest::*;
pub use window::*;

/// Normalize a record by population in millions.
///
/// Values are kept unrounded; the 3-decimal rounding happens once, when the
/// cell is rendered. A zero population yields `None` rather than an infinite
/// ratio.
pub fn per_million(record: &DailyRecord, population: u64) -> Option<PerMillion> {
    if population == 0 {
        return None;
    }
    let millions = population as f64 / 1_000_000.0;
    Some(PerMillion {
        confirmed: record.confirmed as f64 / millions,
        deaths: record.deaths as f64 / millions,
        recovered: record.recovered as f64 / millions,
    })
}

/// Case-insensitive name ordering, ties broken by the exact name.
pub fn cmp_country(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
