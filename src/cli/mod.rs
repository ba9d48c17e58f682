//! Command-line parsing for the TCO calculator.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the cost/formula code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{AssetKind, Drivetrain};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "tco", version, about = "Transport-Asset Total Cost of Ownership Calculator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute the TCO breakdown for a single vehicle JSON.
    Run(RunArgs),
    /// Compare a fleet CSV and rank vehicles by levelized EUR/km.
    Compare(CompareArgs),
    /// Sweep annual mileage and report levelized EUR/km over the grid.
    Sweep(SweepArgs),
    /// Plot a previously exported sweep JSON.
    Plot(PlotArgs),
}

/// Options shared by all computing subcommands.
#[derive(Debug, Parser, Clone)]
pub struct CommonArgs {
    /// Country parameter table JSON (built-in DE table when omitted).
    #[arg(short = 'p', long)]
    pub params: Option<PathBuf>,

    /// Holding period in years (vehicle service life when omitted).
    #[arg(long)]
    pub years: Option<u32>,

    /// Override the country table's discount rate (e.g. 0.05).
    #[arg(long)]
    pub discount_rate: Option<f64>,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for a single-vehicle run.
#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Vehicle record JSON.
    #[arg(short = 'v', long)]
    pub vehicle: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,

    /// Monte Carlo sensitivity runs (0 disables sensitivity).
    #[arg(long, default_value_t = 0)]
    pub mc_runs: usize,

    /// Monte Carlo seed.
    #[arg(long, default_value_t = 42)]
    pub mc_seed: u64,

    /// Lognormal sigma on energy price levels.
    #[arg(long, default_value_t = 0.15)]
    pub mc_price_sigma: f64,

    /// Lognormal sigma on annual distance.
    #[arg(long, default_value_t = 0.10)]
    pub mc_distance_sigma: f64,

    /// Export the result row to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the full breakdown to JSON.
    #[arg(long = "export-breakdown")]
    pub export_breakdown: Option<PathBuf>,
}

/// Options for a fleet comparison.
#[derive(Debug, Parser, Clone)]
pub struct CompareArgs {
    /// Fleet list CSV.
    #[arg(short = 'f', long)]
    pub fleet: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,

    /// Show top-N cheapest and priciest vehicles.
    #[arg(long, default_value_t = 10)]
    pub top: usize,

    /// Only include this asset kind.
    #[arg(long, value_enum)]
    pub kind: Option<AssetKind>,

    /// Only include this drivetrain.
    #[arg(long, value_enum)]
    pub drivetrain: Option<Drivetrain>,

    /// Export per-vehicle results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

/// Options for an annual-km sweep.
#[derive(Debug, Parser, Clone)]
pub struct SweepArgs {
    /// Vehicle record JSON.
    #[arg(short = 'v', long)]
    pub vehicle: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,

    /// Minimum annual km.
    #[arg(long, default_value_t = 40_000.0)]
    pub km_min: f64,

    /// Maximum annual km.
    #[arg(long, default_value_t = 160_000.0)]
    pub km_max: f64,

    /// Grid steps.
    #[arg(long, default_value_t = 25)]
    pub steps: usize,

    /// Export the sweep (grid + metadata) to JSON.
    #[arg(long = "export-sweep")]
    pub export_sweep: Option<PathBuf>,
}

/// Options for plotting a saved sweep.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Sweep JSON file produced by `tco sweep --export-sweep`.
    #[arg(long, value_name = "JSON")]
    pub sweep: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}
