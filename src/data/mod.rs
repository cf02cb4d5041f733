//! Input collaborators: the downloaded time series and the curated reference table.

pub mod refs;
pub mod series;

pub use refs::{load_country_refs, parse_country_refs};
pub use series::{SeriesClient, parse_series_json, read_series_json};
