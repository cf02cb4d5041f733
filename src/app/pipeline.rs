//! Shared report pipeline used by every subcommand.
//!
//! download -> load refs + series -> compute reports -> write TSV files
//!
//! Loading and writing touch the filesystem/network; `run_reports` is pure and
//! only reads the two inputs.

use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::data::{SeriesClient, load_country_refs, read_series_json};
use crate::domain::{CountryRefs, CountryWindow, HotspotRow, LatestRow, RunConfig, SelectedRow, TimeSeries};
use crate::error::AppError;
use crate::io::export::{
    LATEST_ALL_FILE, LATEST_SELECTED_FILE, window_file_name, write_country_window_tsv, write_latest_all_tsv,
    write_latest_selected_tsv,
};
use crate::metrics;

/// The two read-only inputs shared by all reports.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub series: TimeSeries,
    pub refs: CountryRefs,
}

/// All computed outputs of a single run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSet {
    pub latest_all: Vec<LatestRow>,
    pub latest_selected: Vec<SelectedRow>,
    pub hotspots: Vec<HotspotRow>,
    pub windows: Vec<CountryWindow>,
}

/// Download (unless offline) and load both inputs.
pub fn load_inputs(config: &RunConfig) -> Result<Inputs, AppError> {
    let refs = load_country_refs(&config.refs_path)?;
    info!(countries = refs.len(), path = %config.refs_path.display(), "country refs loaded");

    let download_path = config.download_path();
    if config.offline {
        info!(path = %download_path.display(), "offline, using cached time series");
    } else {
        SeriesClient::from_env().download(&download_path)?;
    }

    let series = read_series_json(&download_path)?;
    if series.is_empty() {
        warn!(path = %download_path.display(), "time series has no countries");
    }
    info!(countries = series.len(), "time series loaded");

    Ok(Inputs { series, refs })
}

/// Compute all four reports.
pub fn run_reports(config: &RunConfig, series: &TimeSeries, refs: &CountryRefs) -> Result<ReportSet, AppError> {
    metrics::ensure_window_len(config.days_past)?;

    let hotspots = metrics::find_unlisted_hotspots(series, refs, config.thresholds)?;
    let latest_all = metrics::latest_all(series)?;
    let latest_selected = metrics::latest_selected(series, refs)?;
    let windows = metrics::rolling_window(series, refs, config.days_past)?;

    Ok(ReportSet {
        latest_all,
        latest_selected,
        hotspots,
        windows,
    })
}

/// Write every TSV report into `dir` and return the written paths.
pub fn write_reports(dir: &Path, reports: &ReportSet) -> Result<Vec<PathBuf>, AppError> {
    create_dir_all(dir).map_err(|e| AppError::io(format!("Failed to create '{}': {e}", dir.display())))?;

    let mut written = Vec::with_capacity(reports.windows.len() + 2);

    let path = dir.join(LATEST_ALL_FILE);
    write_latest_all_tsv(&path, &reports.latest_all)?;
    written.push(path);

    let path = dir.join(LATEST_SELECTED_FILE);
    write_latest_selected_tsv(&path, &reports.latest_selected)?;
    written.push(path);

    for window in &reports.windows {
        let path = dir.join(window_file_name(&window.code));
        write_country_window_tsv(&path, window)?;
        written.push(path);
    }

    info!(files = written.len(), dir = %dir.display(), "reports written");
    Ok(written)
}

/// Latest date of a country, if it has any records.
pub fn reference_latest_date(series: &TimeSeries, country: &str) -> Option<NaiveDate> {
    series.latest(country).ok().map(|r| r.date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HotspotThresholds;
    use crate::error::ErrorKind;
    use std::fs;

    const SERIES_JSON: &str = r#"{
        "Germany": [
            {"date": "2021-3-3", "confirmed": 1000, "deaths": 0, "recovered": 0},
            {"date": "2021-3-4", "confirmed": 1500, "deaths": 2, "recovered": 10},
            {"date": "2021-3-5", "confirmed": 2500, "deaths": 5, "recovered": 30}
        ],
        "Brazil": [
            {"date": "2021-3-5", "confirmed": 4000, "deaths": 1, "recovered": 0}
        ],
        "andorra": [
            {"date": "2021-3-5", "confirmed": 3, "deaths": 0, "recovered": 0}
        ]
    }"#;

    const REFS_TSV: &str = "Country\tCode\tPopulation\tPop_Density\tGDP_mon_capita\nGermany\tDE\t2000000\t232\t3900\n";

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("country-trends-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn config(dir: &Path) -> RunConfig {
        RunConfig {
            data_dir: dir.to_path_buf(),
            refs_path: dir.join("ref_selected_countries.tsv"),
            offline: true,
            days_past: 30,
            thresholds: HotspotThresholds::default(),
            reference_country: Some("Germany".to_string()),
        }
    }

    fn seeded(name: &str) -> (PathBuf, RunConfig) {
        let dir = temp_dir(name);
        let config = config(&dir);
        fs::write(config.download_path(), SERIES_JSON).unwrap();
        fs::write(&config.refs_path, REFS_TSV).unwrap();
        (dir, config)
    }

    #[test]
    fn offline_run_computes_all_reports() {
        let (dir, config) = seeded("offline");
        let inputs = load_inputs(&config).unwrap();
        let reports = run_reports(&config, &inputs.series, &inputs.refs).unwrap();

        let names: Vec<&str> = reports.latest_all.iter().map(|r| r.country.as_str()).collect();
        assert_eq!(names, vec!["andorra", "Brazil", "Germany"]);
        assert_eq!(reports.latest_selected.len(), 1);
        assert_eq!(reports.hotspots.len(), 1);
        assert_eq!(reports.hotspots[0].country, "Brazil");

        let window = &reports.windows[0];
        assert_eq!(window.rows.len(), 3);
        let last = window.rows[2].change.unwrap();
        assert_eq!(last.deaths_factor, 2.5);
        assert_eq!(last.recovered_factor, Some(3.0));

        assert_eq!(
            reference_latest_date(&inputs.series, "Germany"),
            NaiveDate::from_ymd_opt(2021, 3, 5)
        );
        assert_eq!(reference_latest_date(&inputs.series, "Atlantis"), None);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn written_reports_use_day_month_year_dates() {
        let (dir, config) = seeded("dates");
        let inputs = load_inputs(&config).unwrap();
        let reports = run_reports(&config, &inputs.series, &inputs.refs).unwrap();
        let out = dir.join("out");
        let paths = write_reports(&out, &reports).unwrap();
        assert_eq!(paths.len(), 3);
        assert!(paths[2].ends_with("country-DE.tsv"));

        for path in &paths {
            let text = fs::read_to_string(path).unwrap();
            assert!(text.contains("05.03.2021"), "{} lacks rendered date", path.display());
            assert!(!text.contains("2021-3-5"));
        }

        let selected = fs::read_to_string(out.join(LATEST_SELECTED_FILE)).unwrap();
        assert!(selected.contains("Germany\t05.03.2021\t2500\t5\t30\t1250.000\t2.500\t15.000"));

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn repeated_runs_write_identical_files() {
        let (dir, config) = seeded("idempotent");
        let inputs = load_inputs(&config).unwrap();

        let first = run_reports(&config, &inputs.series, &inputs.refs).unwrap();
        let second = run_reports(&config, &inputs.series, &inputs.refs).unwrap();
        assert_eq!(first, second);

        let a = write_reports(&dir.join("a"), &first).unwrap();
        let b = write_reports(&dir.join("b"), &second).unwrap();
        for (pa, pb) in a.iter().zip(&b) {
            assert_eq!(fs::read(pa).unwrap(), fs::read(pb).unwrap());
        }

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn short_window_fails_before_any_report() {
        let (dir, mut config) = seeded("short-window");
        config.days_past = 1;
        let inputs = load_inputs(&config).unwrap();
        let err = run_reports(&config, &inputs.series, &inputs.refs).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn stale_refs_surface_not_found() {
        let (dir, config) = seeded("stale-refs");
        fs::write(
            &config.refs_path,
            "Country\tCode\tPopulation\tPop_Density\tGDP_mon_capita\nAtlantis\tAT\t1000\t1\t1\n",
        )
        .unwrap();
        let inputs = load_inputs(&config).unwrap();
        let err = run_reports(&config, &inputs.series, &inputs.refs).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn offline_without_cache_is_io_error() {
        let dir = temp_dir("no-cache");
        let config = config(&dir);
        fs::write(&config.refs_path, REFS_TSV).unwrap();
        let err = load_inputs(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        fs::remove_dir_all(dir).ok();
    }
}
