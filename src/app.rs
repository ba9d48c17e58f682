//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves the country parameter table
//! - loads vehicle/fleet inputs
//! - runs the calculators (and optional sweeps/sensitivity)
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::calc::resolve_holding_period;
use crate::cli::{Command, CommonArgs, CompareArgs, PlotArgs, RunArgs, SweepArgs};
use crate::domain::{SweepGrid, TcoConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `tco` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Compare(args) => handle_compare(args),
        Command::Sweep(args) => handle_sweep(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_run(args: RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let params = pipeline::load_params(&config)?;
    let vehicle = crate::io::vehicle::read_vehicle_json(&args.vehicle)?;

    let output = pipeline::run_single(&vehicle, &params, &config)?;

    println!("{}", crate::report::format_run_summary(&output.breakdown));
    if let Some(mc) = &output.sensitivity {
        println!("{}", crate::report::format_sensitivity(mc));
    }

    if config.plot {
        let plot = crate::plot::render_retention_plot(
            &output.breakdown.residual.retention_curve,
            config.plot_width,
            config.plot_height,
        );
        println!("Residual retention (share of gross):\n{plot}");
    }

    if let Some(path) = &config.export_results {
        crate::io::export::write_results_csv(path, std::slice::from_ref(&output.breakdown))?;
    }
    if let Some(path) = &config.export_breakdown {
        crate::io::export::write_breakdown_json(path, &output.breakdown)?;
    }

    Ok(())
}

fn handle_compare(args: CompareArgs) -> Result<(), AppError> {
    let config = compare_config_from_args(&args);
    let params = pipeline::load_params(&config)?;

    let output = pipeline::run_fleet(&args.fleet, &params, &config)?;

    println!("{}", crate::report::format_ingest_summary(&output.fleet));
    println!("{}", crate::report::format_comparison(&output.rankings));

    if config.plot {
        // Fleet scatter: every vehicle at (annual km, EUR/km), no curve.
        let points: Vec<(f64, f64)> = output
            .fleet
            .vehicles
            .iter()
            .zip(output.breakdowns.iter())
            .map(|(v, b)| (v.annual_km, b.eur_per_km))
            .collect();
        let empty = SweepGrid {
            annual_km: Vec::new(),
            eur_per_km: Vec::new(),
        };
        let plot =
            crate::plot::render_sweep_plot(&empty, &points, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    if let Some(path) = &config.export_results {
        crate::io::export::write_results_csv(path, &output.breakdowns)?;
    }

    Ok(())
}

fn handle_sweep(args: SweepArgs) -> Result<(), AppError> {
    let config = sweep_config_from_args(&args);
    let params = pipeline::load_params(&config)?;
    let vehicle = crate::io::vehicle::read_vehicle_json(&args.vehicle)?;

    let grid = crate::sweep::run_sweep(&vehicle, &params, &config)?;
    let holding = resolve_holding_period(&vehicle, &config)?;

    println!(
        "Sweep: {} ({}, {}) over [{:.0}, {:.0}] km/a, {}y horizon",
        vehicle.id,
        vehicle.kind.display_name(),
        vehicle.drivetrain.display_name(),
        config.km_min,
        config.km_max,
        holding
    );
    if let (Some(first), Some(last)) = (grid.eur_per_km.first(), grid.eur_per_km.last()) {
        println!("EUR/km: {first:.4} at the low end, {last:.4} at the high end\n");
    }

    if config.plot {
        // Mark the grid point closest to the vehicle's configured utilization.
        let overlay: Vec<(f64, f64)> = grid
            .annual_km
            .iter()
            .zip(grid.eur_per_km.iter())
            .min_by(|a, b| {
                let da = (a.0 - vehicle.annual_km).abs();
                let db = (b.0 - vehicle.annual_km).abs();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(&km, &y)| vec![(km, y)])
            .unwrap_or_default();
        let plot =
            crate::plot::render_sweep_plot(&grid, &overlay, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    if let Some(path) = &config.export_sweep {
        crate::io::sweep_file::write_sweep_json(path, &vehicle, &params, holding, grid)?;
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let sweep = crate::io::sweep_file::read_sweep_json(&args.sweep)?;

    println!(
        "Sweep of {} ({}, {}) in {} over {}y",
        sweep.vehicle_id,
        sweep.kind.display_name(),
        sweep.drivetrain.display_name(),
        sweep.country,
        sweep.holding_period_years
    );
    let plot = crate::plot::render_sweep_plot(&sweep.grid, &[], args.width, args.height);
    println!("{plot}");
    Ok(())
}

fn base_config(common: &CommonArgs) -> TcoConfig {
    TcoConfig {
        params_path: common.params.clone(),
        holding_period_years: common.years,
        discount_rate_override: common.discount_rate,
        plot: common.plot && !common.no_plot,
        plot_width: common.width,
        plot_height: common.height,
        ..TcoConfig::default()
    }
}

pub fn run_config_from_args(args: &RunArgs) -> TcoConfig {
    TcoConfig {
        mc_runs: args.mc_runs,
        mc_seed: args.mc_seed,
        mc_price_sigma: args.mc_price_sigma,
        mc_distance_sigma: args.mc_distance_sigma,
        export_results: args.export.clone(),
        export_breakdown: args.export_breakdown.clone(),
        ..base_config(&args.common)
    }
}

pub fn compare_config_from_args(args: &CompareArgs) -> TcoConfig {
    TcoConfig {
        top_n: args.top,
        filter_kind: args.kind,
        filter_drivetrain: args.drivetrain,
        export_results: args.export.clone(),
        ..base_config(&args.common)
    }
}

pub fn sweep_config_from_args(args: &SweepArgs) -> TcoConfig {
    TcoConfig {
        km_min: args.km_min,
        km_max: args.km_max,
        km_steps: args.steps,
        export_sweep: args.export_sweep.clone(),
        ..base_config(&args.common)
    }
}
