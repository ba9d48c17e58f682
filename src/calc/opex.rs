//! Operational expenditure: the recurring annual running costs.
//!
//! Costs are computed per operating year (0-based) so that escalating prices
//! and expiring exemptions land in the right year; discounting happens in the
//! TCO assembly, not here.

use crate::data::CountryParams;
use crate::domain::{AssetKind, OpexYear, VehicleRecord};
use crate::error::AppError;
use crate::finance::escalate;

/// Compute undiscounted operating costs for years `0..holding_period`.
///
/// `gross_investment` is the CAPEX gross (insurance and ship maintenance are
/// quoted as shares of it).
pub fn compute_opex_years(
    vehicle: &VehicleRecord,
    params: &CountryParams,
    gross_investment: f64,
    holding_period_years: u32,
) -> Result<Vec<OpexYear>, AppError> {
    let carrier = params.energy_for(vehicle.drivetrain)?;
    let annual_kwh = vehicle.annual_km * vehicle.consumption_kwh_per_km;
    let tax_base = params.circulation_tax(vehicle.gross_weight_t)?;

    let mut years = Vec::with_capacity(holding_period_years as usize);
    for year in 0..holding_period_years {
        let energy = annual_kwh * escalate(carrier.eur_per_kwh, carrier.escalation, year);

        // kg CO2 priced in EUR/t.
        let co2_price = escalate(params.co2_price_eur_per_t, params.co2_price_escalation, year);
        let carbon = annual_kwh * carrier.co2_kg_per_kwh * co2_price / 1_000.0;

        let maintenance = match vehicle.kind {
            AssetKind::Truck => params.maintenance.truck_eur_per_km * vehicle.annual_km,
            AssetKind::Ship => params.maintenance.ship_share_of_price * gross_investment,
        };

        let toll_exempt =
            params.toll.zero_emission_exempt && vehicle.drivetrain.is_zero_emission();
        let toll = if toll_exempt {
            0.0
        } else {
            params.toll.tolled_share * vehicle.annual_km * params.toll.eur_per_km
        };

        let tax_exempt = vehicle.drivetrain.is_zero_emission()
            && year < params.tax.zero_emission_exempt_years;
        let tax = if tax_exempt { 0.0 } else { tax_base };

        let insurance = params.insurance_rate * gross_investment;
        let labor = vehicle.annual_hours * params.wage_eur_per_h;

        let opex = OpexYear {
            year,
            energy,
            carbon,
            maintenance,
            toll,
            tax,
            insurance,
            labor,
        };
        if !opex.total().is_finite() {
            return Err(AppError::internal(format!(
                "Non-finite OPEX in year {year} for vehicle '{}'.",
                vehicle.id
            )));
        }
        years.push(opex);
    }
    Ok(years)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::builtin_de;
    use crate::domain::Drivetrain;

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
            service_life_years: 10,
        }
    }

    #[test]
    fn diesel_pays_toll_tax_and_carbon() {
        let params = builtin_de();
        let years = compute_opex_years(&diesel_truck(), &params, 120_000.0, 3).unwrap();
        let y0 = &years[0];
        assert!(y0.toll > 0.0);
        assert!(y0.tax > 0.0);
        assert!(y0.carbon > 0.0);

        let expected_toll = 0.85 * 100_000.0 * 0.19;
        assert!((y0.toll - expected_toll).abs() < 1e-6, "got {}", y0.toll);
    }

    #[test]
    fn bev_toll_and_early_tax_exemptions() {
        let params = builtin_de();
        let mut v = diesel_truck();
        v.drivetrain = Drivetrain::Bev;
        v.consumption_kwh_per_km = 1.3;

        let years = compute_opex_years(&v, &params, 300_000.0, 8).unwrap();
        for y in &years {
            assert_eq!(y.toll, 0.0, "BEV toll must be exempt in year {}", y.year);
            assert_eq!(y.carbon, 0.0, "BEV carbon must be zero in year {}", y.year);
        }
        // Tax exemption expires after 5 operating years.
        assert_eq!(years[4].tax, 0.0);
        assert!(years[5].tax > 0.0);
    }

    #[test]
    fn energy_cost_escalates() {
        let params = builtin_de();
        let years = compute_opex_years(&diesel_truck(), &params, 120_000.0, 5).unwrap();
        assert!(
            years[4].energy > years[0].energy,
            "diesel price escalation should raise later years"
        );
        let ratio = years[1].energy / years[0].energy;
        assert!((ratio - 1.02).abs() < 1e-9, "year-over-year ratio {ratio}");
    }

    #[test]
    fn ship_maintenance_is_share_of_price() {
        let params = builtin_de();
        let mut v = diesel_truck();
        v.kind = AssetKind::Ship;
        let years = compute_opex_years(&v, &params, 2_000_000.0, 1).unwrap();
        let expected = params.maintenance.ship_share_of_price * 2_000_000.0;
        assert!((years[0].maintenance - expected).abs() < 1e-6);
    }

    #[test]
    fn labor_uses_hours_and_wage() {
        let params = builtin_de();
        let years = compute_opex_years(&diesel_truck(), &params, 120_000.0, 1).unwrap();
        assert!((years[0].labor - 1_800.0 * params.wage_eur_per_h).abs() < 1e-9);
    }
}
