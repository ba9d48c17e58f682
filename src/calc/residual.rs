//! Residual value: a multiplicative pipeline of depreciation factors.
//!
//! The resale value of an asset at age `n` is modeled as
//!
//! `RV = gross * age_factor * mileage_factor * market_factor`
//!
//! floored at the scrap share of gross. The factors interact: a high-mileage
//! BEV is hit by both the mileage penalty and the thinner second-hand market,
//! but the scrap floor keeps the pipeline from collapsing to zero.

use crate::data::{CountryParams, ResidualParams};
use crate::domain::{ResidualBlock, VehicleRecord};
use crate::error::AppError;
use crate::finance::discount_factor;

/// Clamp bounds for the mileage factor. Outside these the signal is noise;
/// the scrap floor dominates below anyway.
const MILEAGE_FACTOR_MIN: f64 = 0.5;
const MILEAGE_FACTOR_MAX: f64 = 1.2;

/// The individual factors at a given age (before the scrap floor).
#[derive(Debug, Clone, Copy)]
struct Factors {
    age: f64,
    mileage: f64,
    raw_share: f64,
}

fn factors_at(
    residual: &ResidualParams,
    market_factor: f64,
    age_years: u32,
    annual_km: f64,
) -> Factors {
    if age_years == 0 {
        // The undepreciated asset: no registration drop, no market discount.
        return Factors {
            age: 1.0,
            mileage: 1.0,
            raw_share: 1.0,
        };
    }

    let age = (1.0 - residual.first_year_drop)
        * (1.0 - residual.annual_depreciation).powi(age_years as i32 - 1);

    let reference_km = residual.reference_km_per_year * age_years as f64;
    let lifetime_km = annual_km * age_years as f64;
    let relative_excess = (lifetime_km - reference_km) / reference_km;
    let mileage = (-residual.mileage_beta * relative_excess)
        .exp()
        .clamp(MILEAGE_FACTOR_MIN, MILEAGE_FACTOR_MAX);

    Factors {
        age,
        mileage,
        raw_share: age * mileage * market_factor,
    }
}

/// Retention share of gross investment at a given age (scrap floor applied).
pub fn retention_share(
    residual: &ResidualParams,
    market_factor: f64,
    age_years: u32,
    annual_km: f64,
) -> f64 {
    factors_at(residual, market_factor, age_years, annual_km)
        .raw_share
        .max(residual.scrap_share)
}

/// Compute the residual value block at the end of the holding period.
pub fn compute_residual(
    vehicle: &VehicleRecord,
    params: &CountryParams,
    gross_investment: f64,
    holding_period_years: u32,
    discount_rate: f64,
) -> Result<ResidualBlock, AppError> {
    let residual = &params.residual;
    let market_factor = params.market_factor_for(vehicle.drivetrain);
    let age = holding_period_years;

    let f = factors_at(residual, market_factor, age, vehicle.annual_km);
    let floored = f.raw_share < residual.scrap_share;
    let share = f.raw_share.max(residual.scrap_share);

    let value = gross_investment * share;
    let discounted = value * discount_factor(discount_rate, age);
    if !(value.is_finite() && discounted.is_finite()) {
        return Err(AppError::internal(format!(
            "Non-finite residual value for vehicle '{}'.",
            vehicle.id
        )));
    }

    let retention_curve = (0..=age)
        .map(|y| retention_share(residual, market_factor, y, vehicle.annual_km))
        .collect();

    Ok(ResidualBlock {
        age_factor: f.age,
        mileage_factor: f.mileage,
        market_factor,
        floored,
        value,
        discounted,
        retention_curve,
    })
}
