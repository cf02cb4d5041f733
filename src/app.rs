//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - sets up logging
//! - parses CLI arguments
//! - loads the inputs and runs the report pipeline
//! - prints terminal tables and writes TSV exports

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::cli::{Command, InputArgs, LatestArgs, RunArgs};
use crate::domain::{HotspotThresholds, RunConfig};
use crate::error::AppError;

pub mod pipeline;

const REFS_FILE: &str = "ref_selected_countries.tsv";
const DEFAULT_DAYS_PAST: usize = 30;

/// Entry point for the `trends` binary.
pub fn run() -> Result<(), AppError> {
    init_logging();

    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Run(args) => handle_run(&run_config_from_args(&args)),
        Command::Hotspots(args) => handle_hotspots(&run_config_from_args(&args)),
        Command::Latest(args) => handle_latest(&args),
    }
}

/// Log to stderr so stdout only carries report tables.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Fails only when a global subscriber is already installed; keep that one.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

fn handle_run(config: &RunConfig) -> Result<(), AppError> {
    let inputs = pipeline::load_inputs(config)?;
    let reports = pipeline::run_reports(config, &inputs.series, &inputs.refs)?;

    println!("{}", crate::report::format_hotspots(&reports.hotspots, config.thresholds));

    pipeline::write_reports(&config.data_dir, &reports)?;
    info!(
        countries = reports.latest_all.len(),
        selected = reports.latest_selected.len(),
        hotspots = reports.hotspots.len(),
        "run complete"
    );

    if let Some(country) = &config.reference_country {
        match pipeline::reference_latest_date(&inputs.series, country) {
            Some(date) => info!(
                "latest date in {country} set: {}",
                crate::report::format_date(date)
            ),
            None => warn!("reference country {country} has no records"),
        }
    }

    Ok(())
}

fn handle_hotspots(config: &RunConfig) -> Result<(), AppError> {
    let inputs = pipeline::load_inputs(config)?;
    let hotspots = crate::metrics::find_unlisted_hotspots(&inputs.series, &inputs.refs, config.thresholds)?;
    println!("{}", crate::report::format_hotspots(&hotspots, config.thresholds));
    Ok(())
}

fn handle_latest(args: &LatestArgs) -> Result<(), AppError> {
    let config = input_config_from_args(&args.input);
    let inputs = pipeline::load_inputs(&config)?;
    let record = inputs.series.latest(&args.country)?;
    let per_million = inputs
        .refs
        .get(&args.country)
        .and_then(|r| crate::metrics::per_million(record, r.population));
    println!(
        "{}",
        crate::report::format_country_snapshot(&args.country, record, per_million)
    );
    Ok(())
}

pub fn run_config_from_args(args: &RunArgs) -> RunConfig {
    let reference = args.reference_country.trim();

    RunConfig {
        days_past: args.days,
        thresholds: HotspotThresholds {
            min_confirmed: args.min_confirmed,
            min_deaths: args.min_deaths,
        },
        reference_country: (!reference.is_empty()).then(|| reference.to_string()),
        ..input_config_from_args(&args.input)
    }
}

/// Config for subcommands that only load inputs; report options keep their defaults.
pub fn input_config_from_args(args: &InputArgs) -> RunConfig {
    let refs_path = args
        .refs
        .clone()
        .unwrap_or_else(|| args.data_dir.join(REFS_FILE));

    RunConfig {
        data_dir: args.data_dir.clone(),
        refs_path,
        offline: args.offline,
        days_past: DEFAULT_DAYS_PAST,
        thresholds: HotspotThresholds::default(),
        reference_country: None,
    }
}

/// Rewrite argv so `trends` defaults to `trends run`.
///
/// Rules:
/// - `trends`                      -> `trends run`
/// - `trends --offline ...`        -> `trends run --offline ...`
/// - `trends --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "run" | "hotspots" | "latest");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
    }
    argv
}
