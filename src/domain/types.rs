//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory while computing a TCO breakdown
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Transport asset class.
///
/// Trucks and ships share the same vehicle record and the same formula
/// modules; the asset kind only switches a handful of per-kind conventions
/// (maintenance basis, toll interpretation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Truck,
    Ship,
}

impl AssetKind {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            AssetKind::Truck => "truck",
            AssetKind::Ship => "ship",
        }
    }

    /// Parse a CSV cell (case-insensitive).
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "truck" => Ok(AssetKind::Truck),
            "ship" => Ok(AssetKind::Ship),
            other => Err(format!("Unknown asset kind '{other}' (expected truck|ship).")),
        }
    }
}

/// Energy carrier / drivetrain of the asset.
///
/// `Diesel` doubles as marine gas oil for ships. All consumption figures are
/// normalized to kWh of carrier energy per km so that carrier prices can be
/// quoted uniformly in EUR/kWh in the country tables.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Drivetrain {
    Diesel,
    Bev,
    Fcev,
    Lng,
}

impl Drivetrain {
    pub const ALL: [Drivetrain; 4] = [
        Drivetrain::Diesel,
        Drivetrain::Bev,
        Drivetrain::Fcev,
        Drivetrain::Lng,
    ];

    /// Zero-emission drivetrains qualify for toll/tax exemptions and purchase
    /// subsidies in most country tables.
    pub fn is_zero_emission(self) -> bool {
        matches!(self, Drivetrain::Bev | Drivetrain::Fcev)
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Drivetrain::Diesel => "diesel",
            Drivetrain::Bev => "BEV",
            Drivetrain::Fcev => "FCEV",
            Drivetrain::Lng => "LNG",
        }
    }

    /// Parse a CSV cell (case-insensitive).
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "diesel" | "mgo" => Ok(Drivetrain::Diesel),
            "bev" | "electric" => Ok(Drivetrain::Bev),
            "fcev" | "hydrogen" | "h2" => Ok(Drivetrain::Fcev),
            "lng" => Ok(Drivetrain::Lng),
            other => Err(format!(
                "Unknown drivetrain '{other}' (expected diesel|bev|fcev|lng)."
            )),
        }
    }
}

/// The shared vehicle-properties record.
///
/// Every calculator (CAPEX, OPEX, RV) reads from this one record; none of
/// them mutate it. Optional fields default to zero/none so that a minimal
/// JSON or CSV row is enough for a first run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub id: String,
    pub kind: AssetKind,
    pub drivetrain: Drivetrain,

    /// Base purchase price excluding battery and infrastructure (EUR).
    pub base_price: f64,
    /// Traction battery capacity (kWh); 0 for non-BEV assets.
    #[serde(default)]
    pub battery_capacity_kwh: f64,
    /// Depot charging / bunkering infrastructure attributable to this asset (EUR).
    #[serde(default)]
    pub infrastructure_cost: f64,
    /// Price of the comparable diesel configuration (EUR), used as the
    /// subsidy reference. When absent, the zero-emission premium is taken to
    /// be battery + infrastructure cost.
    #[serde(default)]
    pub diesel_reference_price: Option<f64>,

    /// Technically permissible gross weight (t). Drives the tax bracket lookup.
    pub gross_weight_t: f64,
    /// Usable payload (t). Drives EUR per tonne-km.
    pub payload_t: f64,

    /// Annual distance (km; km sailed for ships).
    pub annual_km: f64,
    /// Carrier energy consumption (kWh/km).
    pub consumption_kwh_per_km: f64,
    /// Paid operating hours per year (driver or crew).
    #[serde(default)]
    pub annual_hours: f64,

    /// Technical service life (years). Upper bound for the holding period.
    pub service_life_years: u32,
}

impl VehicleRecord {
    /// Field-level validation with a row/file-agnostic error message.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Empty vehicle id.".to_string());
        }
        if !(self.base_price.is_finite() && self.base_price > 0.0) {
            return Err("`base_price` must be finite and > 0.".to_string());
        }
        if !(self.battery_capacity_kwh.is_finite() && self.battery_capacity_kwh >= 0.0) {
            return Err("`battery_capacity_kwh` must be finite and >= 0.".to_string());
        }
        if !(self.infrastructure_cost.is_finite() && self.infrastructure_cost >= 0.0) {
            return Err("`infrastructure_cost` must be finite and >= 0.".to_string());
        }
        if let Some(reference) = self.diesel_reference_price {
            if !(reference.is_finite() && reference > 0.0) {
                return Err("`diesel_reference_price` must be finite and > 0.".to_string());
            }
        }
        if !(self.gross_weight_t.is_finite() && self.gross_weight_t > 0.0) {
            return Err("`gross_weight_t` must be finite and > 0.".to_string());
        }
        if !(self.payload_t.is_finite() && self.payload_t > 0.0) {
            return Err("`payload_t` must be finite and > 0.".to_string());
        }
        if !(self.annual_km.is_finite() && self.annual_km > 0.0) {
            return Err("`annual_km` must be finite and > 0.".to_string());
        }
        if !(self.consumption_kwh_per_km.is_finite() && self.consumption_kwh_per_km > 0.0) {
            return Err("`consumption_kwh_per_km` must be finite and > 0.".to_string());
        }
        if !(self.annual_hours.is_finite() && self.annual_hours >= 0.0) {
            return Err("`annual_hours` must be finite and >= 0.".to_string());
        }
        if self.service_life_years == 0 {
            return Err("`service_life_years` must be >= 1.".to_string());
        }
        Ok(())
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct TcoConfig {
    /// Country parameter table JSON; `None` uses the built-in default table.
    pub params_path: Option<PathBuf>,
    /// Holding period (years); `None` uses the vehicle's service life.
    pub holding_period_years: Option<u32>,
    /// Override for the country table's discount rate.
    pub discount_rate_override: Option<f64>,

    pub top_n: usize,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_results: Option<PathBuf>,
    pub export_breakdown: Option<PathBuf>,
    pub export_sweep: Option<PathBuf>,

    /// Monte Carlo sensitivity runs (0 disables sensitivity).
    pub mc_runs: usize,
    pub mc_seed: u64,
    /// Lognormal sigma applied to energy price levels.
    pub mc_price_sigma: f64,
    /// Lognormal sigma applied to annual distance.
    pub mc_distance_sigma: f64,

    /// Annual-km sweep range (for `tco sweep`).
    pub km_min: f64,
    pub km_max: f64,
    pub km_steps: usize,

    /// Fleet filters (for `tco compare`).
    pub filter_kind: Option<AssetKind>,
    pub filter_drivetrain: Option<Drivetrain>,
}

impl Default for TcoConfig {
    fn default() -> Self {
        Self {
            params_path: None,
            holding_period_years: None,
            discount_rate_override: None,
            top_n: 10,
            plot: false,
            plot_width: 100,
            plot_height: 25,
            export_results: None,
            export_breakdown: None,
            export_sweep: None,
            mc_runs: 0,
            mc_seed: 42,
            mc_price_sigma: 0.15,
            mc_distance_sigma: 0.10,
            km_min: 40_000.0,
            km_max: 160_000.0,
            km_steps: 25,
            filter_kind: None,
            filter_drivetrain: None,
        }
    }
}

/// Upfront investment block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapexBlock {
    /// Base + battery + infrastructure (EUR).
    pub gross: f64,
    /// Purchase subsidy deducted from gross (EUR).
    pub subsidy: f64,
    /// Gross minus subsidy (EUR).
    pub net: f64,
    /// Equity portion paid upfront (EUR).
    pub equity: f64,
    /// Financed principal (EUR).
    pub loan: f64,
    /// Constant annual loan payment (EUR/a).
    pub annual_payment: f64,
    /// Total interest over the loan term (EUR).
    pub interest: f64,
}

/// Operating costs of a single year (undiscounted EUR).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpexYear {
    /// Operating year, 0-based.
    pub year: u32,
    pub energy: f64,
    pub carbon: f64,
    pub maintenance: f64,
    pub toll: f64,
    pub tax: f64,
    pub insurance: f64,
    pub labor: f64,
}

impl OpexYear {
    pub fn total(&self) -> f64 {
        self.energy
            + self.carbon
            + self.maintenance
            + self.toll
            + self.tax
            + self.insurance
            + self.labor
    }
}

/// Discounted component totals over the holding period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpexTotals {
    pub energy: f64,
    pub carbon: f64,
    pub maintenance: f64,
    pub toll: f64,
    pub tax: f64,
    pub insurance: f64,
    pub labor: f64,
    pub total: f64,
}

/// Residual value block: the multiplicative factor pipeline plus the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResidualBlock {
    /// `(1 - first_year_drop) * (1 - annual_dep)^(age-1)`.
    pub age_factor: f64,
    /// Penalty/bonus for lifetime mileage vs the reference (clamped).
    pub mileage_factor: f64,
    /// Second-hand market appetite for the drivetrain.
    pub market_factor: f64,
    /// Whether the scrap-value floor was binding.
    pub floored: bool,
    /// Residual value at the end of the holding period (EUR, undiscounted).
    pub value: f64,
    /// Residual value discounted to year 0 (EUR).
    pub discounted: f64,
    /// Retention share of gross investment per year `0..=holding_period`.
    pub retention_curve: Vec<f64>,
}

/// Full TCO result for one vehicle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TcoBreakdown {
    pub vehicle_id: String,
    pub kind: AssetKind,
    pub drivetrain: Drivetrain,
    pub holding_period_years: u32,
    pub discount_rate: f64,
    pub currency: String,

    pub capex: CapexBlock,
    pub opex_years: Vec<OpexYear>,
    pub opex: OpexTotals,
    pub residual: ResidualBlock,

    /// CAPEX net + interest + discounted OPEX - discounted RV (EUR).
    pub total: f64,
    /// `sum df(y) * annual_km` over the holding period.
    pub discounted_km: f64,
    pub eur_per_km: f64,
    pub eur_per_tkm: f64,
}

/// A saved mileage sweep (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepFile {
    pub tool: String,
    pub created: chrono::NaiveDate,
    pub country: String,
    pub vehicle_id: String,
    pub kind: AssetKind,
    pub drivetrain: Drivetrain,
    pub holding_period_years: u32,
    pub grid: SweepGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepGrid {
    pub annual_km: Vec<f64>,
    pub eur_per_km: Vec<f64>,
}
