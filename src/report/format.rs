//! Value and terminal table formatting.
//!
//! TSV exports and terminal output share the cell formatters here so every
//! report renders dates and ratios the same way.

use chrono::NaiveDate;

use crate::domain::{DailyRecord, HotspotRow, HotspotThresholds, PerMillion};

/// Render a date as `DD.MM.YYYY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// Render a real with exactly 3 decimals.
pub fn fmt_fixed3(value: f64) -> String {
    format!("{value:.3}")
}

/// Render an optional real with 3 decimals; absent values are empty.
pub fn fmt_opt3(value: Option<f64>) -> String {
    value.map(fmt_fixed3).unwrap_or_default()
}

/// Render an optional integer; absent values are empty.
pub fn fmt_opt_int(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Per-million cells in `confirmed, deaths, recovered` order.
pub fn per_million_cells(per_million: Option<PerMillion>) -> [String; 3] {
    match per_million {
        Some(pm) => [fmt_fixed3(pm.confirmed), fmt_fixed3(pm.deaths), fmt_fixed3(pm.recovered)],
        None => [String::new(), String::new(), String::new()],
    }
}

/// Format the unlisted-hotspot table.
pub fn format_hotspots(rows: &[HotspotRow], thresholds: HotspotThresholds) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Further interesting countries (confirmed >= {} or deaths >= {}):\n",
        thresholds.min_confirmed, thresholds.min_deaths
    ));

    if rows.is_empty() {
        out.push_str("(none)\n");
        return out;
    }

    out.push_str(&format!("{:<32} {:>12} {:>10}\n", "country", "confirmed", "deaths"));
    out.push_str(&format!("{:-<32} {:-<12} {:-<10}\n", "", "", ""));
    for r in rows {
        out.push_str(&format!("{:<32} {:>12} {:>10}\n", r.country, r.confirmed, r.deaths));
    }
    out
}

/// Format the latest snapshot of one country.
pub fn format_country_snapshot(country: &str, record: &DailyRecord, per_million: Option<PerMillion>) -> String {
    let mut out = String::new();
    out.push_str(&format!("{country} as of {}\n", format_date(record.date)));
    out.push_str(&format!("{:<12} {:>12} {:>14}\n", "", "count", "per million"));

    let [pm_confirmed, pm_deaths, pm_recovered] = per_million_cells(per_million);
    for (label, count, pm) in [
        ("confirmed", record.confirmed, pm_confirmed),
        ("deaths", record.deaths, pm_deaths),
        ("recovered", record.recovered, pm_recovered),
    ] {
        let pm = if pm.is_empty() { "-".to_string() } else { pm };
        out.push_str(&format!("{label:<12} {count:>12} {pm:>14}\n"));
    }
    out
}
