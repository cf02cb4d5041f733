//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the read-only inputs (`TimeSeries`, `CountryRefs`)
//! - the rows of the four reports
//! - the resolved run options (`RunConfig`)

pub mod types;

pub use types::*;
