//! Capital expenditure: gross investment, subsidy, financing.

use crate::data::CountryParams;
use crate::domain::{CapexBlock, VehicleRecord};
use crate::error::AppError;
use crate::finance::amortize;

/// Compute the upfront investment block for a vehicle.
pub fn compute_capex(
    vehicle: &VehicleRecord,
    params: &CountryParams,
) -> Result<CapexBlock, AppError> {
    let battery_cost = vehicle.battery_capacity_kwh * params.battery_eur_per_kwh;
    let gross = vehicle.base_price + battery_cost + vehicle.infrastructure_cost;

    let subsidy = subsidy_amount(vehicle, params, gross, battery_cost);
    let net = gross - subsidy;

    let equity = net * params.equity_share;
    let schedule = amortize(net - equity, params.loan_interest_rate, params.loan_term_years);

    let block = CapexBlock {
        gross,
        subsidy,
        net,
        equity,
        loan: schedule.principal,
        annual_payment: schedule.annual_payment,
        interest: schedule.interest,
    };

    for (name, v) in [
        ("gross", block.gross),
        ("subsidy", block.subsidy),
        ("net", block.net),
        ("interest", block.interest),
    ] {
        if !v.is_finite() {
            return Err(AppError::internal(format!(
                "Non-finite CAPEX `{name}` for vehicle '{}'.",
                vehicle.id
            )));
        }
    }
    Ok(block)
}

/// Purchase subsidy: a share of the zero-emission premium, capped.
///
/// The premium is `gross - diesel_reference_price` when the vehicle names a
/// reference configuration, otherwise the zero-emission add-ons (battery +
/// infrastructure). Non-zero-emission drivetrains get nothing.
fn subsidy_amount(
    vehicle: &VehicleRecord,
    params: &CountryParams,
    gross: f64,
    battery_cost: f64,
) -> f64 {
    if !vehicle.drivetrain.is_zero_emission() {
        return 0.0;
    }
    let premium = match vehicle.diesel_reference_price {
        Some(reference) => (gross - reference).max(0.0),
        None => battery_cost + vehicle.infrastructure_cost,
    };
    (params.subsidy.share * premium).min(params.subsidy.cap_eur)
}
