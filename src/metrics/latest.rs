//! Latest-entry snapshots and the unlisted-hotspot check.

use crate::domain::types::latest_record;
use crate::domain::{CountryRefs, HotspotRow, HotspotThresholds, LatestRow, SelectedRow, TimeSeries};
use crate::error::AppError;

use super::{cmp_country, per_million};

/// Latest record of every country, sorted by name case-insensitively.
///
/// A country without records is an `InvalidData` error.
pub fn latest_all(series: &TimeSeries) -> Result<Vec<LatestRow>, AppError> {
    let mut rows = Vec::with_capacity(series.len());
    for (country, records) in series.countries() {
        let record = latest_record(country, records)?;
        rows.push(LatestRow {
            country: country.to_string(),
            record: *record,
        });
    }
    rows.sort_by(|a, b| cmp_country(&a.country, &b.country));
    Ok(rows)
}

/// Latest record of every curated country plus per-million values.
///
/// A curated country missing from the series is a `NotFound` error.
pub fn latest_selected(series: &TimeSeries, refs: &CountryRefs) -> Result<Vec<SelectedRow>, AppError> {
    let mut rows = Vec::with_capacity(refs.len());
    for (country, reference) in refs {
        let record = series.latest(country)?;
        rows.push(SelectedRow {
            country: country.clone(),
            record: *record,
            per_million: per_million(record, reference.population),
        });
    }
    rows.sort_by(|a, b| cmp_country(&a.country, &b.country));
    Ok(rows)
}

/// Countries outside the curated set whose latest counts reach either threshold.
pub fn find_unlisted_hotspots(
    series: &TimeSeries,
    refs: &CountryRefs,
    thresholds: HotspotThresholds,
) -> Result<Vec<HotspotRow>, AppError> {
    let mut rows = Vec::new();
    for (country, records) in series.countries() {
        if refs.contains_key(country) {
            continue;
        }
        let latest = latest_record(country, records)?;
        if latest.confirmed >= thresholds.min_confirmed || latest.deaths >= thresholds.min_deaths {
            rows.push(HotspotRow {
                country: country.to_string(),
                confirmed: latest.confirmed,
                deaths: latest.deaths,
            });
        }
    }
    rows.sort_by(|a, b| cmp_country(&a.country, &b.country));
    Ok(rows)
}
