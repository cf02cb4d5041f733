//! Export report rows as tab-separated files.
//!
//! Column layouts are stable so spreadsheets and plotting scripts reading the
//! files keep working across runs.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{CountryWindow, LatestRow, SelectedRow};
use crate::error::AppError;
use crate::report::{fmt_opt3, fmt_opt_int, format_date, per_million_cells};

pub const LATEST_ALL_FILE: &str = "countries-latest-all.tsv";
pub const LATEST_SELECTED_FILE: &str = "countries-latest-selected.tsv";

const LATEST_HEADER: [&str; 5] = ["# Country", "Date", "Confirmed", "Deaths", "Recovered"];

const PER_MILLION_HEADER: [&str; 3] = ["Confirmed per Million", "Deaths per Million", "Recovered per Million"];

const WINDOW_CHANGE_HEADER: [&str; 6] = [
    "Confirmed Change",
    "Deaths Change",
    "Recovered Change",
    "Confirmed Change Factor",
    "Deaths Change Factor",
    "Recovered Change Factor",
];

/// File name of a country's rolling-window export.
pub fn window_file_name(code: &str) -> String {
    format!("country-{code}.tsv")
}

fn tsv_writer<W: Write>(out: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'\t')
        .flexible(false)
        .from_writer(out)
}

fn create(path: &Path) -> Result<File, AppError> {
    File::create(path).map_err(|e| AppError::io(format!("Failed to create '{}': {e}", path.display())))
}

fn write_err(e: csv::Error) -> AppError {
    AppError::io(format!("Failed to write TSV row: {e}"))
}

/// Write the all-countries latest snapshot.
pub fn write_latest_all<W: Write>(out: W, rows: &[LatestRow]) -> Result<(), AppError> {
    let mut writer = tsv_writer(out);
    writer.write_record(LATEST_HEADER).map_err(write_err)?;
    for row in rows {
        let r = &row.record;
        writer
            .write_record([
                row.country.clone(),
                format_date(r.date),
                r.confirmed.to_string(),
                r.deaths.to_string(),
                r.recovered.to_string(),
            ])
            .map_err(write_err)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush TSV: {e}")))
}

/// Write the curated-countries latest snapshot with per-million values.
pub fn write_latest_selected<W: Write>(out: W, rows: &[SelectedRow]) -> Result<(), AppError> {
    let mut writer = tsv_writer(out);
    let header: Vec<&str> = LATEST_HEADER.iter().chain(PER_MILLION_HEADER.iter()).copied().collect();
    writer.write_record(&header).map_err(write_err)?;
    for row in rows {
        let r = &row.record;
        let [pm_confirmed, pm_deaths, pm_recovered] = per_million_cells(row.per_million);
        writer
            .write_record([
                row.country.clone(),
                format_date(r.date),
                r.confirmed.to_string(),
                r.deaths.to_string(),
                r.recovered.to_string(),
                pm_confirmed,
                pm_deaths,
                pm_recovered,
            ])
            .map_err(write_err)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush TSV: {e}")))
}

/// Write one country's rolling window.
///
/// `Confirmed Change Factor` stays in the layout but is always empty.
pub fn write_country_window<W: Write>(out: W, window: &CountryWindow) -> Result<(), AppError> {
    let mut writer = tsv_writer(out);
    let header: Vec<&str> = ["#", "Date", "Confirmed", "Deaths", "Recovered"]
        .iter()
        .chain(PER_MILLION_HEADER.iter())
        .chain(WINDOW_CHANGE_HEADER.iter())
        .copied()
        .collect();
    writer.write_record(&header).map_err(write_err)?;

    for row in &window.rows {
        let r = &row.record;
        let [pm_confirmed, pm_deaths, pm_recovered] = per_million_cells(row.per_million);
        let change = row.change;
        writer
            .write_record([
                row.day_index.to_string(),
                format_date(r.date),
                r.confirmed.to_string(),
                r.deaths.to_string(),
                r.recovered.to_string(),
                pm_confirmed,
                pm_deaths,
                pm_recovered,
                fmt_opt_int(change.map(|c| c.confirmed)),
                fmt_opt_int(change.map(|c| c.deaths)),
                fmt_opt_int(change.map(|c| c.recovered)),
                String::new(),
                fmt_opt3(change.map(|c| c.deaths_factor)),
                fmt_opt3(change.and_then(|c| c.recovered_factor)),
            ])
            .map_err(write_err)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush TSV: {e}")))
}

pub fn write_latest_all_tsv(path: &Path, rows: &[LatestRow]) -> Result<(), AppError> {
    write_latest_all(create(path)?, rows)
}

pub fn write_latest_selected_tsv(path: &Path, rows: &[SelectedRow]) -> Result<(), AppError> {
    write_latest_selected(create(path)?, rows)
}

pub fn write_country_window_tsv(path: &Path, window: &CountryWindow) -> Result<(), AppError> {
    write_country_window(create(path)?, window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DailyRecord, DayChange, PerMillion, WindowRow};
    use chrono::NaiveDate;

    fn record() -> DailyRecord {
        DailyRecord {
            date: NaiveDate::from_ymd_opt(2021, 3, 5).unwrap(),
            confirmed: 1200,
            deaths: 6,
            recovered: 40,
        }
    }

    #[test]
    fn latest_all_writes_header_and_rows() {
        let rows = vec![LatestRow {
            country: "Korea, South".to_string(),
            record: record(),
        }];
        let mut buf = Vec::new();
        write_latest_all(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "# Country\tDate\tConfirmed\tDeaths\tRecovered\nKorea, South\t05.03.2021\t1200\t6\t40\n"
        );
    }

    #[test]
    fn latest_selected_renders_three_decimals() {
        let rows = vec![SelectedRow {
            country: "Chad".to_string(),
            record: record(),
            per_million: Some(PerMillion {
                confirmed: 75.0,
                deaths: 0.375,
                recovered: 2.5,
            }),
        }];
        let mut buf = Vec::new();
        write_latest_selected(&mut buf, &rows).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let line = text.lines().nth(1).unwrap();
        assert_eq!(line, "Chad\t05.03.2021\t1200\t6\t40\t75.000\t0.375\t2.500");
        assert!(text.lines().next().unwrap().ends_with("Recovered per Million"));
    }

    #[test]
    fn window_leaves_absent_changes_empty() {
        let window = CountryWindow {
            country: "Germany".to_string(),
            code: "DE".to_string(),
            rows: vec![
                WindowRow {
                    day_index: -1,
                    record: record(),
                    per_million: None,
                    change: None,
                },
                WindowRow {
                    day_index: 0,
                    record: record(),
                    per_million: None,
                    change: Some(DayChange {
                        confirmed: 0,
                        deaths: -2,
                        recovered: 5,
                        deaths_factor: 0.75,
                        recovered_factor: None,
                    }),
                },
            ],
        };
        let mut buf = Vec::new();
        write_country_window(&mut buf, &window).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].split('\t').count(), 14);
        assert_eq!(lines[1], "-1\t05.03.2021\t1200\t6\t40\t\t\t\t\t\t\t\t\t");
        assert_eq!(lines[2], "0\t05.03.2021\t1200\t6\t40\t\t\t\t0\t-2\t5\t\t0.750\t");
    }

    #[test]
    fn window_file_name_uses_code() {
        assert_eq!(window_file_name("DE"), "country-DE.tsv");
    }
}
