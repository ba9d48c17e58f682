//! Monte Carlo sensitivity on energy prices and annual distance.
//!
//! Each run draws lognormal multipliers for the energy price level and the
//! annual distance, recomputes the TCO, and the summary reports percentiles.
//! The shocks are mean-corrected (`exp(sigma z - sigma^2/2)`) so the expected
//! multiplier is exactly 1 and the ensemble stays centered on the base case.
//!
//! Determinism: the RNG is seeded from a hash of the inputs plus the user
//! seed, and each run derives its own seed, so results are reproducible and
//! independent of rayon's scheduling.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use rayon::prelude::*;

use crate::calc::compute_tco;
use crate::data::CountryParams;
use crate::domain::{TcoConfig, VehicleRecord};
use crate::error::AppError;

/// Percentile summary of a Monte Carlo ensemble.
#[derive(Debug, Clone)]
pub struct McSummary {
    pub runs: usize,
    pub mean_total: f64,
    pub p10_total: f64,
    pub p50_total: f64,
    pub p90_total: f64,
    pub mean_eur_per_km: f64,
    pub p10_eur_per_km: f64,
    pub p50_eur_per_km: f64,
    pub p90_eur_per_km: f64,
}

/// Run the sensitivity ensemble.
pub fn run_monte_carlo(
    vehicle: &VehicleRecord,
    params: &CountryParams,
    config: &TcoConfig,
) -> Result<McSummary, AppError> {
    if config.mc_runs == 0 {
        return Err(AppError::input("Monte Carlo runs must be > 0."));
    }
    if !(config.mc_price_sigma.is_finite() && config.mc_price_sigma >= 0.0) {
        return Err(AppError::input("`--mc-price-sigma` must be finite and >= 0."));
    }
    if !(config.mc_distance_sigma.is_finite() && config.mc_distance_sigma >= 0.0) {
        return Err(AppError::input("`--mc-distance-sigma` must be finite and >= 0."));
    }

    let base_seed = ensemble_seed(vehicle, params, config);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::internal(format!("Noise distribution error: {e}")))?;

    let results: Vec<(f64, f64)> = (0..config.mc_runs)
        .into_par_iter()
        .map(|run| {
            let mut rng = StdRng::seed_from_u64(run_seed(base_seed, run));
            let price_mult = lognormal_mult(config.mc_price_sigma, normal.sample(&mut rng));
            let distance_mult = lognormal_mult(config.mc_distance_sigma, normal.sample(&mut rng));

            let mut scenario_vehicle = vehicle.clone();
            scenario_vehicle.annual_km = vehicle.annual_km * distance_mult;

            let mut scenario_params = params.clone();
            for carrier in scenario_params.energy.values_mut() {
                carrier.eur_per_kwh *= price_mult;
            }

            compute_tco(&scenario_vehicle, &scenario_params, config)
                .map(|b| (b.total, b.eur_per_km))
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let mut totals: Vec<f64> = results.iter().map(|r| r.0).collect();
    let mut per_km: Vec<f64> = results.iter().map(|r| r.1).collect();
    totals.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    per_km.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    Ok(McSummary {
        runs: results.len(),
        mean_total: mean(&totals),
        p10_total: percentile(&totals, 0.10),
        p50_total: percentile(&totals, 0.50),
        p90_total: percentile(&totals, 0.90),
        mean_eur_per_km: mean(&per_km),
        p10_eur_per_km: percentile(&per_km, 0.10),
        p50_eur_per_km: percentile(&per_km, 0.50),
        p90_eur_per_km: percentile(&per_km, 0.90),
    })
}

/// Mean-corrected lognormal multiplier: `E[exp(sigma z - sigma^2/2)] = 1`.
fn lognormal_mult(sigma: f64, z: f64) -> f64 {
    (sigma * z - 0.5 * sigma * sigma).exp()
}

fn ensemble_seed(vehicle: &VehicleRecord, params: &CountryParams, config: &TcoConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    vehicle.id.hash(&mut hasher);
    vehicle.annual_km.to_bits().hash(&mut hasher);
    vehicle.consumption_kwh_per_km.to_bits().hash(&mut hasher);
    params.country.hash(&mut hasher);
    config.mc_seed.hash(&mut hasher);
    config.mc_runs.hash(&mut hasher);
    config.mc_price_sigma.to_bits().hash(&mut hasher);
    config.mc_distance_sigma.to_bits().hash(&mut hasher);
    hasher.finish()
}

fn run_seed(base: u64, run: usize) -> u64 {
    // SplitMix-style spread so consecutive runs land far apart.
    base ^ (run as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

fn mean(sorted: &[f64]) -> f64 {
    sorted.iter().sum::<f64>() / sorted.len() as f64
}

/// Linear-interpolated percentile over a sorted slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q * (sorted.len() as f64 - 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = pos - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::builtin_de;
    use crate::domain::{AssetKind, Drivetrain};

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

    fn mc_config(runs: usize, seed: u64) -> TcoConfig {
        TcoConfig {
            mc_runs: runs,
            mc_seed: seed,
            ..TcoConfig::default()
        }
    }

    #[test]
    fn percentile_interpolates() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((percentile(&v, 0.5) - 3.0).abs() < 1e-12);
        assert!((percentile(&v, 0.25) - 2.0).abs() < 1e-12);
        assert!((percentile(&v, 1.0) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn deterministic_given_seed() {
        let params = builtin_de();
        let a = run_monte_carlo(&diesel_truck(), &params, &mc_config(64, 7)).unwrap();
        let b = run_monte_carlo(&diesel_truck(), &params, &mc_config(64, 7)).unwrap();
        assert_eq!(a.mean_total.to_bits(), b.mean_total.to_bits());
        assert_eq!(a.p90_eur_per_km.to_bits(), b.p90_eur_per_km.to_bits());
    }

    #[test]
    fn different_seed_changes_ensemble() {
        let params = builtin_de();
        let a = run_monte_carlo(&diesel_truck(), &params, &mc_config(64, 7)).unwrap();
        let b = run_monte_carlo(&diesel_truck(), &params, &mc_config(64, 8)).unwrap();
        assert!((a.mean_total - b.mean_total).abs() > 1e-9);
    }

    #[test]
    fn percentiles_are_ordered() {
        let params = builtin_de();
        let s = run_monte_carlo(&diesel_truck(), &params, &mc_config(256, 42)).unwrap();
        assert!(s.p10_total <= s.p50_total && s.p50_total <= s.p90_total);
        assert!(s.p10_eur_per_km <= s.p50_eur_per_km && s.p50_eur_per_km <= s.p90_eur_per_km);
    }

    #[test]
    fn zero_sigma_collapses_the_ensemble() {
        let params = builtin_de();
        let config = TcoConfig {
            mc_runs: 16,
            mc_price_sigma: 0.0,
            mc_distance_sigma: 0.0,
            ..TcoConfig::default()
        };
        let s = run_monte_carlo(&diesel_truck(), &params, &config).unwrap();
        assert!((s.p10_total - s.p90_total).abs() < 1e-9);
    }

    #[test]
    fn zero_runs_is_input_error() {
        let params = builtin_de();
        let err = run_monte_carlo(&diesel_truck(), &params, &mc_config(0, 7)).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
