//! `country-trends` library crate.
//!
//! The binary (`trends`) is a thin wrapper around this library so that:
//!
//! - report logic is testable without spawning processes or touching the network
//! - the two inputs (time series, country refs) are passed explicitly to every report

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod metrics;
pub mod report;
