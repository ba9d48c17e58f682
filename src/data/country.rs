//! Country-specific JSON parameter tables.
//!
//! A `CountryParams` table carries everything the formula modules look up:
//! energy prices, CO2 pricing, toll and circulation-tax rules, financing
//! terms, subsidy scheme, and residual-value parameters.
//!
//! Design goals:
//! - **Strict validation** with clear errors (exit code 2)
//! - **Deterministic behavior** (no hidden environment lookups)
//! - **Separation of concerns**: no cost formulas here, lookups only

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::Drivetrain;
use crate::error::AppError;

/// Price and carbon intensity of one energy carrier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyCarrier {
    /// Price per kWh of carrier energy (EUR/kWh).
    pub eur_per_kwh: f64,
    /// Annual price escalation rate.
    #[serde(default)]
    pub escalation: f64,
    /// Tank-to-wheel CO2 intensity (kg CO2 per kWh of carrier energy).
    #[serde(default)]
    pub co2_kg_per_kwh: f64,
}

/// Distance-based toll (fairway/port dues for ships).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TollParams {
    pub eur_per_km: f64,
    /// Share of annual distance on tolled infrastructure.
    pub tolled_share: f64,
    /// Whether zero-emission drivetrains are exempt.
    #[serde(default)]
    pub zero_emission_exempt: bool,
}

/// One weight bracket of the circulation-tax table.
///
/// `max_weight_t = None` marks the upper-open last bracket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxBracket {
    pub max_weight_t: Option<f64>,
    pub eur_per_year: f64,
}

/// Annual circulation/vehicle tax rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxParams {
    /// Brackets sorted by ascending `max_weight_t`.
    pub brackets: Vec<TaxBracket>,
    /// Zero-emission vehicles pay nothing during their first N operating years.
    #[serde(default)]
    pub zero_emission_exempt_years: u32,
}

/// Maintenance cost basis, per asset kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceParams {
    /// Trucks: EUR per km.
    pub truck_eur_per_km: f64,
    /// Ships: share of gross investment per year.
    pub ship_share_of_price: f64,
}

/// Purchase subsidy for zero-emission assets.
///
/// The subsidy applies to the zero-emission *premium* over a comparable
/// diesel configuration, not to the full purchase price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsidyParams {
    /// Funded share of the premium.
    pub share: f64,
    /// Absolute cap per asset (EUR).
    pub cap_eur: f64,
}

/// Residual-value depreciation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResidualParams {
    /// Extra value drop in the first year (registration effect).
    pub first_year_drop: f64,
    /// Depreciation rate per year after the first.
    pub annual_depreciation: f64,
    /// Sensitivity of resale value to lifetime mileage vs the reference.
    pub mileage_beta: f64,
    /// Lifetime mileage a buyer expects at a given age (km per year of age).
    pub reference_km_per_year: f64,
    /// Second-hand market appetite per drivetrain (1.0 = neutral).
    pub market_factor: BTreeMap<Drivetrain, f64>,
    /// Value floor as a share of gross investment (scrap/parts value).
    pub scrap_share: f64,
}

/// The full country parameter table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryParams {
    pub country: String,
    pub currency: String,

    /// Discount rate used for present values.
    pub discount_rate: f64,
    /// Loan interest rate.
    pub loan_interest_rate: f64,
    pub loan_term_years: u32,
    /// Upfront equity share of the net investment.
    pub equity_share: f64,

    /// Traction battery pack price (EUR per kWh), for BEV gross investment.
    pub battery_eur_per_kwh: f64,

    pub energy: BTreeMap<Drivetrain, EnergyCarrier>,
    /// CO2 price (EUR per tonne).
    pub co2_price_eur_per_t: f64,
    #[serde(default)]
    pub co2_price_escalation: f64,

    pub toll: TollParams,
    pub tax: TaxParams,

    /// Annual insurance premium as a share of gross investment.
    pub insurance_rate: f64,
    pub maintenance: MaintenanceParams,
    /// Driver/crew wage (EUR per hour).
    pub wage_eur_per_h: f64,

    pub subsidy: SubsidyParams,
    pub residual: ResidualParams,
}

impl CountryParams {
    /// Energy carrier entry for a drivetrain, or a clear error naming it.
    pub fn energy_for(&self, drivetrain: Drivetrain) -> Result<&EnergyCarrier, AppError> {
        self.energy.get(&drivetrain).ok_or_else(|| {
            AppError::input(format!(
                "Country table '{}' has no energy entry for drivetrain '{}'.",
                self.country,
                drivetrain.display_name()
            ))
        })
    }

    /// Market factor for a drivetrain (1.0 when the table has no entry).
    pub fn market_factor_for(&self, drivetrain: Drivetrain) -> f64 {
        self.residual
            .market_factor
            .get(&drivetrain)
            .copied()
            .unwrap_or(1.0)
    }

    /// Annual circulation tax for a gross weight (bracket lookup).
    pub fn circulation_tax(&self, gross_weight_t: f64) -> Result<f64, AppError> {
        for bracket in &self.tax.brackets {
            match bracket.max_weight_t {
                Some(max) if gross_weight_t <= max => return Ok(bracket.eur_per_year),
                Some(_) => continue,
                None => return Ok(bracket.eur_per_year),
            }
        }
        Err(AppError::input(format!(
            "No circulation-tax bracket covers gross weight {gross_weight_t} t \
             (add an upper-open bracket to the country table)."
        )))
    }

    /// Validate table-wide invariants. Called once after loading.
    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.discount_rate.is_finite() && self.discount_rate > -1.0) {
            return Err(AppError::input("`discount_rate` must be finite and > -1."));
        }
        if !(self.loan_interest_rate.is_finite() && self.loan_interest_rate > -1.0) {
            return Err(AppError::input("`loan_interest_rate` must be finite and > -1."));
        }
        if self.loan_term_years == 0 {
            return Err(AppError::input("`loan_term_years` must be >= 1."));
        }
        if !(self.equity_share.is_finite() && (0.0..=1.0).contains(&self.equity_share)) {
            return Err(AppError::input("`equity_share` must be within [0, 1]."));
        }
        if !(self.battery_eur_per_kwh.is_finite() && self.battery_eur_per_kwh >= 0.0) {
            return Err(AppError::input("`battery_eur_per_kwh` must be finite and >= 0."));
        }
        if self.energy.is_empty() {
            return Err(AppError::input("`energy` table must not be empty."));
        }
        for (drivetrain, carrier) in &self.energy {
            if !(carrier.eur_per_kwh.is_finite() && carrier.eur_per_kwh >= 0.0) {
                return Err(AppError::input(format!(
                    "Energy price for '{}' must be finite and >= 0.",
                    drivetrain.display_name()
                )));
            }
            if !(carrier.escalation.is_finite() && carrier.escalation > -1.0) {
                return Err(AppError::input(format!(
                    "Energy escalation for '{}' must be finite and > -1.",
                    drivetrain.display_name()
                )));
            }
            if !(carrier.co2_kg_per_kwh.is_finite() && carrier.co2_kg_per_kwh >= 0.0) {
                return Err(AppError::input(format!(
                    "CO2 intensity for '{}' must be finite and >= 0.",
                    drivetrain.display_name()
                )));
            }
        }
        if !(self.co2_price_eur_per_t.is_finite() && self.co2_price_eur_per_t >= 0.0) {
            return Err(AppError::input("`co2_price_eur_per_t` must be finite and >= 0."));
        }
        if !(self.toll.eur_per_km.is_finite() && self.toll.eur_per_km >= 0.0) {
            return Err(AppError::input("`toll.eur_per_km` must be finite and >= 0."));
        }
        if !(self.toll.tolled_share.is_finite() && (0.0..=1.0).contains(&self.toll.tolled_share)) {
            return Err(AppError::input("`toll.tolled_share` must be within [0, 1]."));
        }
        if self.tax.brackets.is_empty() {
            return Err(AppError::input("`tax.brackets` must not be empty."));
        }
        let mut prev_max = 0.0_f64;
        for (i, bracket) in self.tax.brackets.iter().enumerate() {
            if !(bracket.eur_per_year.is_finite() && bracket.eur_per_year >= 0.0) {
                return Err(AppError::input("Tax bracket amounts must be finite and >= 0."));
            }
            match bracket.max_weight_t {
                Some(max) => {
                    if !(max.is_finite() && max > prev_max) {
                        return Err(AppError::input(
                            "`tax.brackets` must be sorted by strictly ascending max_weight_t.",
                        ));
                    }
                    prev_max = max;
                }
                None if i + 1 != self.tax.brackets.len() => {
                    return Err(AppError::input(
                        "Only the last tax bracket may be upper-open (max_weight_t = null).",
                    ));
                }
                None => {}
            }
        }
        if !(self.insurance_rate.is_finite() && self.insurance_rate >= 0.0) {
            return Err(AppError::input("`insurance_rate` must be finite and >= 0."));
        }
        if !(self.maintenance.truck_eur_per_km.is_finite()
            && self.maintenance.truck_eur_per_km >= 0.0)
        {
            return Err(AppError::input("`maintenance.truck_eur_per_km` must be finite and >= 0."));
        }
        if !(self.maintenance.ship_share_of_price.is_finite()
            && self.maintenance.ship_share_of_price >= 0.0)
        {
            return Err(AppError::input(
                "`maintenance.ship_share_of_price` must be finite and >= 0.",
            ));
        }
        if !(self.wage_eur_per_h.is_finite() && self.wage_eur_per_h >= 0.0) {
            return Err(AppError::input("`wage_eur_per_h` must be finite and >= 0."));
        }
        if !(self.subsidy.share.is_finite() && (0.0..=1.0).contains(&self.subsidy.share)) {
            return Err(AppError::input("`subsidy.share` must be within [0, 1]."));
        }
        if !(self.subsidy.cap_eur.is_finite() && self.subsidy.cap_eur >= 0.0) {
            return Err(AppError::input("`subsidy.cap_eur` must be finite and >= 0."));
        }

        let r = &self.residual;
        if !(r.first_year_drop.is_finite() && (0.0..1.0).contains(&r.first_year_drop)) {
            return Err(AppError::input("`residual.first_year_drop` must be within [0, 1)."));
        }
        if !(r.annual_depreciation.is_finite() && (0.0..1.0).contains(&r.annual_depreciation)) {
            return Err(AppError::input("`residual.annual_depreciation` must be within [0, 1)."));
        }
        if !(r.mileage_beta.is_finite() && r.mileage_beta >= 0.0) {
            return Err(AppError::input("`residual.mileage_beta` must be finite and >= 0."));
        }
        if !(r.reference_km_per_year.is_finite() && r.reference_km_per_year > 0.0) {
            return Err(AppError::input(
                "`residual.reference_km_per_year` must be finite and > 0.",
            ));
        }
        for (drivetrain, factor) in &r.market_factor {
            if !(factor.is_finite() && *factor > 0.0) {
                return Err(AppError::input(format!(
                    "Market factor for '{}' must be finite and > 0.",
                    drivetrain.display_name()
                )));
            }
        }
        if !(r.scrap_share.is_finite() && (0.0..1.0).contains(&r.scrap_share)) {
            return Err(AppError::input("`residual.scrap_share` must be within [0, 1)."));
        }
        Ok(())
    }
}

/// Load and validate a country table from a JSON file.
pub fn load_country_params(path: &Path) -> Result<CountryParams, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::input(format!("Failed to open country table '{}': {e}", path.display()))
    })?;
    let params: CountryParams = serde_json::from_reader(file)
        .map_err(|e| AppError::input(format!("Invalid country table JSON: {e}")))?;
    params.validate()?;
    Ok(params)
}

/// Built-in default table (Germany-like figures).
///
/// Used when `--params` is absent and by unit tests; the values are round
/// ballpark figures, not an authoritative source.
pub fn builtin_de() -> CountryParams {
    let mut energy = BTreeMap::new();
    energy.insert(
        Drivetrain::Diesel,
        EnergyCarrier {
            // 1.55 EUR/l over ~9.8 kWh/l.
            eur_per_kwh: 0.158,
            escalation: 0.02,
            co2_kg_per_kwh: 0.266,
        },
    );
    energy.insert(
        Drivetrain::Bev,
        EnergyCarrier {
            eur_per_kwh: 0.22,
            escalation: 0.01,
            co2_kg_per_kwh: 0.0,
        },
    );
    energy.insert(
        Drivetrain::Fcev,
        EnergyCarrier {
            // 9.50 EUR/kg over 33.3 kWh/kg.
            eur_per_kwh: 0.285,
            escalation: -0.01,
            co2_kg_per_kwh: 0.0,
        },
    );
    energy.insert(
        Drivetrain::Lng,
        EnergyCarrier {
            eur_per_kwh: 0.11,
            escalation: 0.02,
            co2_kg_per_kwh: 0.202,
        },
    );

    let mut market_factor = BTreeMap::new();
    market_factor.insert(Drivetrain::Diesel, 1.0);
    market_factor.insert(Drivetrain::Bev, 0.85);
    market_factor.insert(Drivetrain::Fcev, 0.75);
    market_factor.insert(Drivetrain::Lng, 0.9);

    CountryParams {
        country: "DE".to_string(),
        currency: "EUR".to_string(),
        discount_rate: 0.05,
        loan_interest_rate: 0.04,
        loan_term_years: 6,
        equity_share: 0.2,
        battery_eur_per_kwh: 250.0,
        energy,
        co2_price_eur_per_t: 55.0,
        co2_price_escalation: 0.05,
        toll: TollParams {
            eur_per_km: 0.19,
            tolled_share: 0.85,
            zero_emission_exempt: true,
        },
        tax: TaxParams {
            brackets: vec![
                TaxBracket {
                    max_weight_t: Some(3.5),
                    eur_per_year: 210.0,
                },
                TaxBracket {
                    max_weight_t: Some(12.0),
                    eur_per_year: 420.0,
                },
                TaxBracket {
                    max_weight_t: Some(18.0),
                    eur_per_year: 556.0,
                },
                TaxBracket {
                    max_weight_t: None,
                    eur_per_year: 929.0,
                },
            ],
            zero_emission_exempt_years: 5,
        },
        insurance_rate: 0.012,
        maintenance: MaintenanceParams {
            truck_eur_per_km: 0.11,
            ship_share_of_price: 0.025,
        },
        wage_eur_per_h: 24.0,
        subsidy: SubsidyParams {
            share: 0.8,
            cap_eur: 300_000.0,
        },
        residual: ResidualParams {
            first_year_drop: 0.15,
            annual_depreciation: 0.12,
            mileage_beta: 0.2,
            reference_km_per_year: 100_000.0,
            market_factor,
            scrap_share: 0.05,
        },
    }
}

/// Resolve the table for a run: explicit path, or the built-in default.
pub fn resolve_params(path: Option<&Path>) -> Result<CountryParams, AppError> {
    match path {
        Some(p) => load_country_params(p),
        None => {
            let params = builtin_de();
            params.validate()?;
            Ok(params)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_is_valid() {
        builtin_de().validate().expect("builtin table must validate");
    }

    #[test]
    fn tax_bracket_lookup() {
        let params = builtin_de();
        assert!((params.circulation_tax(3.0).unwrap() - 210.0).abs() < 1e-9);
        assert!((params.circulation_tax(12.0).unwrap() - 420.0).abs() < 1e-9);
        assert!((params.circulation_tax(40.0).unwrap() - 929.0).abs() < 1e-9);
    }

    #[test]
    fn unsorted_brackets_rejected() {
        let mut params = builtin_de();
        params.tax.brackets.swap(0, 1);
        assert!(params.validate().is_err());
    }

    #[test]
    fn non_terminal_open_bracket_rejected() {
        let mut params = builtin_de();
        params.tax.brackets.insert(
            0,
            TaxBracket {
                max_weight_t: None,
                eur_per_year: 0.0,
            },
        );
        assert!(params.validate().is_err());
    }

    #[test]
    fn missing_energy_entry_is_input_error() {
        let mut params = builtin_de();
        params.energy.remove(&Drivetrain::Fcev);
        let err = params.energy_for(Drivetrain::Fcev).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn market_factor_defaults_to_neutral() {
        let mut params = builtin_de();
        params.residual.market_factor.clear();
        assert!((params.market_factor_for(Drivetrain::Bev) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn country_json_round_trip() {
        let params = builtin_de();
        let json = serde_json::to_string(&params).unwrap();
        let back: CountryParams = serde_json::from_str(&json).unwrap();
        back.validate().unwrap();
        assert_eq!(back.country, "DE");
        assert!((back.energy[&Drivetrain::Bev].eur_per_kwh - 0.22).abs() < 1e-12);
    }
}
