//! Annual-km sweep grid.
//!
//! A sweep answers "at what utilization does this asset pay off?": the same
//! vehicle is evaluated over a linear grid of annual distances and the
//! levelized EUR/km at each point is recorded. Points are independent, so the
//! grid is evaluated in parallel.

use rayon::prelude::*;

use crate::calc::compute_tco;
use crate::data::CountryParams;
use crate::domain::{SweepGrid, TcoConfig, VehicleRecord};
use crate::error::AppError;

/// Generate `steps` linearly spaced points between `min` and `max` (inclusive).
pub fn lin_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && min > 0.0 && max > min) {
        return Err(AppError::input(format!(
            "Invalid sweep range: min={min}, max={max} (must be finite, >0, and max>min)."
        )));
    }
    if steps < 2 {
        return Err(AppError::input("Sweep steps must be >= 2."));
    }

    let step = (max - min) / (steps as f64 - 1.0);
    Ok((0..steps).map(|i| min + step * i as f64).collect())
}

/// Evaluate the levelized EUR/km over an annual-km grid.
pub fn run_sweep(
    vehicle: &VehicleRecord,
    params: &CountryParams,
    config: &TcoConfig,
) -> Result<SweepGrid, AppError> {
    let annual_km = lin_space(config.km_min, config.km_max, config.km_steps)?;

    let eur_per_km = annual_km
        .par_iter()
        .map(|&km| {
            let mut scenario = vehicle.clone();
            scenario.annual_km = km;
            compute_tco(&scenario, params, config).map(|b| b.eur_per_km)
        })
        .collect::<Result<Vec<f64>, AppError>>()?;

    Ok(SweepGrid {
        annual_km,
        eur_per_km,
    })
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

    #[test]
    fn lin_space_includes_endpoints() {
        let v = lin_space(40_000.0, 160_000.0, 7).unwrap();
        assert_eq!(v.len(), 7);
        assert!((v[0] - 40_000.0).abs() < 1e-9);
        assert!((v[6] - 160_000.0).abs() < 1e-9);
    }

    #[test]
    fn lin_space_rejects_bad_ranges() {
        assert!(lin_space(100.0, 50.0, 5).is_err());
        assert!(lin_space(0.0, 100.0, 5).is_err());
        assert!(lin_space(1.0, 2.0, 1).is_err());
    }

    #[test]
    fn eur_per_km_falls_with_utilization() {
        // Fixed costs (CAPEX, insurance, labor, tax) spread over more km, so
        // the levelized cost must decrease monotonically over the grid.
        let params = builtin_de();
        let grid = run_sweep(&diesel_truck(), &params, &TcoConfig::default()).unwrap();
        for pair in grid.eur_per_km.windows(2) {
            assert!(
                pair[1] < pair[0],
                "EUR/km should fall with annual km: {} -> {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn grid_lengths_match() {
        let params = builtin_de();
        let config = TcoConfig {
            km_steps: 11,
            ..TcoConfig::default()
        };
        let grid = run_sweep(&diesel_truck(), &params, &config).unwrap();
        assert_eq!(grid.annual_km.len(), 11);
        assert_eq!(grid.eur_per_km.len(), 11);
    }
}
