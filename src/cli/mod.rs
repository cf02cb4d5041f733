//! Command-line parsing for the country report generator.
//!
//! Parsing only produces argument structs; `app` turns them into a
//! `RunConfig` and dispatches.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "trends", version, about = "Per-country daily case reports from a public time series")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download the series, write all TSV reports and print unlisted hotspots.
    Run(RunArgs),
    /// Print countries outside the curated list that pass the thresholds.
    Hotspots(RunArgs),
    /// Print the latest snapshot of one country.
    Latest(LatestArgs),
}

/// Where the inputs come from; shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// Directory holding the cached download and the written reports.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Curated country reference table (defaults to `<data-dir>/ref_selected_countries.tsv`).
    #[arg(long)]
    pub refs: Option<PathBuf>,

    /// Skip the download and read the cached time series.
    #[arg(long)]
    pub offline: bool,
}

/// Options of the report-producing subcommands.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Number of most recent days in each country's rolling window.
    #[arg(long, default_value_t = 30)]
    pub days: usize,

    /// Hotspot threshold on confirmed cases.
    #[arg(long, default_value_t = 1000)]
    pub min_confirmed: u64,

    /// Hotspot threshold on deaths.
    #[arg(long, default_value_t = 10)]
    pub min_deaths: u64,

    /// Country whose latest date is logged after a run (empty to disable).
    #[arg(long, default_value = "Germany")]
    pub reference_country: String,
}

#[derive(Debug, Args, Clone)]
pub struct LatestArgs {
    /// Country name as used in the time series.
    pub country: String,

    #[command(flatten)]
    pub input: InputArgs,
}
