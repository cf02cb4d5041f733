//! Curated country reference table (tab-separated).
//!
//! Expected header: `Country  Code  Population  Pop_Density  GDP_mon_capita`.
//! Rows whose country starts with `#` are commented out and skipped.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{CountryRef, CountryRefs};
use crate::error::AppError;

const COL_COUNTRY: &str = "country";
const COL_CODE: &str = "code";
const COL_POPULATION: &str = "population";
const COL_DENSITY: &str = "pop_density";
const COL_GDP: &str = "gdp_mon_capita";

/// Load the reference table from a file.
pub fn load_country_refs(path: &Path) -> Result<CountryRefs, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(format!("Failed to open country refs '{}': {e}", path.display())))?;
    parse_country_refs(file)
}

/// Parse the reference table from any reader.
pub fn parse_country_refs<R: Read>(input: R) -> Result<CountryRefs, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::invalid_data(format!("Failed to read country refs header: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    for column in [COL_COUNTRY, COL_CODE, COL_POPULATION, COL_DENSITY, COL_GDP] {
        if !header_map.contains_key(column) {
            return Err(AppError::invalid_data(format!(
                "Country refs are missing required column `{column}`."
            )));
        }
    }

    let mut refs = CountryRefs::new();
    for (idx, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        let record =
            result.map_err(|e| AppError::invalid_data(format!("Country refs line {line}: {e}")))?;

        let country = field(&record, &header_map, COL_COUNTRY);
        if country.is_empty() || country.starts_with('#') {
            continue;
        }

        let reference = parse_row(&record, &header_map)
            .map_err(|msg| AppError::invalid_data(format!("Country refs line {line} ({country}): {msg}")))?;
        refs.insert(country.to_string(), reference);
    }

    Ok(refs)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}').trim_start_matches('#').trim();
    name.to_ascii_lowercase()
}

fn field<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, column: &str) -> &'a str {
    header_map
        .get(column)
        .and_then(|&idx| record.get(idx))
        .unwrap_or("")
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<CountryRef, String> {
    let code = field(record, header_map, COL_CODE);
    if code.is_empty() {
        return Err("missing `Code`".to_string());
    }

    let raw_population = field(record, header_map, COL_POPULATION);
    let population = raw_population
        .parse::<u64>()
        .ok()
        .filter(|&p| p > 0)
        .ok_or_else(|| format!("invalid `Population` '{raw_population}'"))?;

    Ok(CountryRef {
        code: code.to_string(),
        population,
        pop_density: parse_positive(field(record, header_map, COL_DENSITY), "Pop_Density")?,
        gdp_per_capita: parse_positive(field(record, header_map, COL_GDP), "GDP_mon_capita")?,
    })
}

fn parse_positive(raw: &str, label: &str) -> Result<f64, String> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => Err(format!("invalid `{label}` '{raw}'")),
    }
}
