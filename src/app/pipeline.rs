//! Shared pipeline logic used by all subcommands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! resolve params -> load vehicle(s) -> compute breakdowns -> rank/summarize
//!
//! The command handlers in `app` can then focus on presentation (printing vs
//! exports).

use std::path::Path;

use rayon::prelude::*;

use crate::calc::compute_tco;
use crate::data::{CountryParams, resolve_params};
use crate::domain::{TcoBreakdown, TcoConfig, VehicleRecord};
use crate::error::AppError;
use crate::io::ingest::{FleetData, load_fleet};
use crate::report::{Rankings, rank_by_unit_cost};
use crate::sweep::{McSummary, run_monte_carlo};

/// All computed outputs of a single `tco run`.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub breakdown: TcoBreakdown,
    pub sensitivity: Option<McSummary>,
}

/// All computed outputs of a `tco compare`.
#[derive(Debug, Clone)]
pub struct FleetOutput {
    pub fleet: FleetData,
    pub breakdowns: Vec<TcoBreakdown>,
    pub rankings: Rankings,
}

/// Resolve the country table for a run.
pub fn load_params(config: &TcoConfig) -> Result<CountryParams, AppError> {
    resolve_params(config.params_path.as_deref())
}

/// Compute a single vehicle, with optional Monte Carlo sensitivity.
pub fn run_single(
    vehicle: &VehicleRecord,
    params: &CountryParams,
    config: &TcoConfig,
) -> Result<RunOutput, AppError> {
    let breakdown = compute_tco(vehicle, params, config)?;
    let sensitivity = if config.mc_runs > 0 {
        Some(run_monte_carlo(vehicle, params, config)?)
    } else {
        None
    };
    Ok(RunOutput {
        breakdown,
        sensitivity,
    })
}

/// Ingest a fleet CSV and compute every vehicle (parallel).
pub fn run_fleet(
    path: &Path,
    params: &CountryParams,
    config: &TcoConfig,
) -> Result<FleetOutput, AppError> {
    let fleet = load_fleet(path, config)?;

    let breakdowns = fleet
        .vehicles
        .par_iter()
        .map(|vehicle| compute_tco(vehicle, params, config))
        .collect::<Result<Vec<_>, AppError>>()?;

    let rankings = rank_by_unit_cost(&breakdowns, config.top_n);

    Ok(FleetOutput {
        fleet,
        breakdowns,
        rankings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AssetKind, Drivetrain};
    use std::io::Write;

    fn diesel_truck() -> VehicleRecord {
        VehicleRecord {
            id: "dsl-40t".to_string(),
            kind: AssetKind::Truck,
            drivetrain: Drivetrain::Diesel,
            base_price: 120_000.0,
            battery_capacity_kwh: 0.0,
            infrastructure_cost: 0.0,
            diesel_reference_price: None,
            gross_weight_t: 40.0,
            payload_t: 25.0,
            annual_km: 100_000.0,
            consumption_kwh_per_km: 3.1,
            annual_hours: 1_800.0,
            service_life_years: 8,
        }
    }

    #[test]
    fn run_single_without_sensitivity() {
        let params = load_params(&TcoConfig::default()).unwrap();
        let out = run_single(&diesel_truck(), &params, &TcoConfig::default()).unwrap();
        assert!(out.sensitivity.is_none());
        assert!(out.breakdown.total > 0.0);
    }

    #[test]
    fn run_single_with_sensitivity() {
        let params = load_params(&TcoConfig::default()).unwrap();
        let config = TcoConfig {
            mc_runs: 32,
            ..TcoConfig::default()
        };
        let out = run_single(&diesel_truck(), &params, &config).unwrap();
        let mc = out.sensitivity.expect("sensitivity requested");
        assert_eq!(mc.runs, 32);
    }

    #[test]
    fn run_fleet_computes_all_rows() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "id,kind,drivetrain,base_price,gross_weight_t,payload_t,annual_km,consumption_kwh_per_km,service_life_years,battery_capacity_kwh"
        )
        .unwrap();
        writeln!(file, "dsl-1,truck,diesel,120000,40,25,100000,3.1,8,").unwrap();
        writeln!(file, "bev-1,truck,bev,180000,40,25,110000,1.3,8,600").unwrap();

        let config = TcoConfig::default();
        let params = load_params(&config).unwrap();
        let out = run_fleet(file.path(), &params, &config).unwrap();
        assert_eq!(out.breakdowns.len(), 2);
        assert_eq!(out.rankings.cheapest.len(), 2);
    }
}
