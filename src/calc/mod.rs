//! TCO assembly: wires the shared vehicle record through the calculators.
//!
//! `TCO = CAPEX_net + interest + sum df(y) * OPEX_y - df(n) * RV`
//!
//! Levelized costs divide by *discounted* transport work so that numerator
//! and denominator live in the same present-value space.

pub mod capex;
pub mod opex;
pub mod residual;

pub use capex::*;
pub use opex::*;
pub use residual::*;

use crate::data::CountryParams;
use crate::domain::{OpexTotals, TcoBreakdown, TcoConfig, VehicleRecord};
use crate::error::AppError;
use crate::finance::discount_factor;

/// Resolve the holding period for a vehicle: explicit override, else the
/// vehicle's service life. Must lie in `[1, service_life]`.
pub fn resolve_holding_period(
    vehicle: &VehicleRecord,
    config: &TcoConfig,
) -> Result<u32, AppError> {
    let holding = config
        .holding_period_years
        .unwrap_or(vehicle.service_life_years);
    if holding == 0 {
        return Err(AppError::input("Holding period must be >= 1 year."));
    }
    if holding > vehicle.service_life_years {
        return Err(AppError::input(format!(
            "Holding period {holding}y exceeds the service life of '{}' ({}y).",
            vehicle.id, vehicle.service_life_years
        )));
    }
    Ok(holding)
}

/// Compute the full TCO breakdown for one vehicle.
pub fn compute_tco(
    vehicle: &VehicleRecord,
    params: &CountryParams,
    config: &TcoConfig,
) -> Result<TcoBreakdown, AppError> {
    vehicle
        .validate()
        .map_err(|e| AppError::input(format!("Vehicle '{}': {e}", vehicle.id)))?;

    let holding = resolve_holding_period(vehicle, config)?;
    let discount_rate = config
        .discount_rate_override
        .unwrap_or(params.discount_rate);
    if !(discount_rate.is_finite() && discount_rate > -1.0) {
        return Err(AppError::input("Discount rate must be finite and > -1."));
    }

    let capex = compute_capex(vehicle, params)?;
    let opex_years = compute_opex_years(vehicle, params, capex.gross, holding)?;
    let residual = compute_residual(vehicle, params, capex.gross, holding, discount_rate)?;

    // Discount each operating year (cashflows at end of year y, so year+1).
    let mut totals = OpexTotals {
        energy: 0.0,
        carbon: 0.0,
        maintenance: 0.0,
        toll: 0.0,
        tax: 0.0,
        insurance: 0.0,
        labor: 0.0,
        total: 0.0,
    };
    let mut discounted_km = 0.0;
    for y in &opex_years {
        let df = discount_factor(discount_rate, y.year + 1);
        totals.energy += df * y.energy;
        totals.carbon += df * y.carbon;
        totals.maintenance += df * y.maintenance;
        totals.toll += df * y.toll;
        totals.tax += df * y.tax;
        totals.insurance += df * y.insurance;
        totals.labor += df * y.labor;
        totals.total += df * y.total();
        discounted_km += df * vehicle.annual_km;
    }

    let total = capex.net + capex.interest + totals.total - residual.discounted;
    if !total.is_finite() {
        return Err(AppError::internal(format!(
            "Non-finite TCO total for vehicle '{}'.",
            vehicle.id
        )));
    }
    if discounted_km <= 0.0 {
        return Err(AppError::internal(format!(
            "Zero discounted transport work for vehicle '{}'.",
            vehicle.id
        )));
    }

    let eur_per_km = total / discounted_km;
    let eur_per_tkm = eur_per_km / vehicle.payload_t;

    Ok(TcoBreakdown {
        vehicle_id: vehicle.id.clone(),
        kind: vehicle.kind,
        drivetrain: vehicle.drivetrain,
        holding_period_years: holding,
        discount_rate,
        currency: params.currency.clone(),
        capex,
        opex_years,
        opex: totals,
        residual,
        total,
        discounted_km,
        eur_per_km,
        eur_per_tkm,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::builtin_de;
    use crate::domain::{AssetKind, Drivetrain};

    fn test_config() -> TcoConfig {
        TcoConfig::default()
    }

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
    fn breakdown_adds_up() {
        let params = builtin_de();
        let b = compute_tco(&diesel_truck(), &params, &test_config()).unwrap();
        let expected = b.capex.net + b.capex.interest + b.opex.total - b.residual.discounted;
        assert!((b.total - expected).abs() < 1e-6);
        assert!(b.total > 0.0);
        assert_eq!(b.opex_years.len(), 8);
    }

    #[test]
    fn component_totals_sum_to_total() {
        let params = builtin_de();
        let b = compute_tco(&diesel_truck(), &params, &test_config()).unwrap();
        let sum = b.opex.energy
            + b.opex.carbon
            + b.opex.maintenance
            + b.opex.toll
            + b.opex.tax
            + b.opex.insurance
            + b.opex.labor;
        assert!((sum - b.opex.total).abs() < 1e-6);
    }

    #[test]
    fn holding_period_must_fit_service_life() {
        let params = builtin_de();
        let mut config = test_config();
        config.holding_period_years = Some(20);
        let err = compute_tco(&diesel_truck(), &params, &config).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn zero_discount_rate_is_fine() {
        let params = builtin_de();
        let mut config = test_config();
        config.discount_rate_override = Some(0.0);
        let b = compute_tco(&diesel_truck(), &params, &config).unwrap();
        // Undiscounted km: n * annual_km exactly.
        assert!((b.discounted_km - 8.0 * 100_000.0).abs() < 1e-6);
    }

    #[test]
    fn eur_per_tkm_divides_by_payload() {
        let params = builtin_de();
        let b = compute_tco(&diesel_truck(), &params, &test_config()).unwrap();
        assert!((b.eur_per_tkm - b.eur_per_km / 25.0).abs() < 1e-12);
    }

    #[test]
    fn invalid_vehicle_is_input_error() {
        let params = builtin_de();
        let mut v = diesel_truck();
        v.annual_km = 0.0;
        let err = compute_tco(&v, &params, &test_config()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
