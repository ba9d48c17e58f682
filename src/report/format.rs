//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the cost/formula code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::TcoBreakdown;
use crate::io::ingest::FleetData;
use crate::report::Rankings;
use crate::sweep::McSummary;

/// Format the full single-vehicle run summary.
pub fn format_run_summary(b: &TcoBreakdown) -> String {
    let mut out = String::new();

    out.push_str("=== tco - Total Cost of Ownership ===\n");
    out.push_str(&format!(
        "Vehicle: {} ({}, {})\n",
        b.vehicle_id,
        b.kind.display_name(),
        b.drivetrain.display_name()
    ));
    out.push_str(&format!(
        "Horizon: {}y | discount rate: {:.2}% | currency: {}\n",
        b.holding_period_years,
        b.discount_rate * 100.0,
        b.currency
    ));

    out.push_str("\nCAPEX:\n");
    out.push_str(&format!("  gross investment  {:>12}\n", fmt_eur(b.capex.gross)));
    out.push_str(&format!("  subsidy           {:>12}\n", fmt_eur(-b.capex.subsidy)));
    out.push_str(&format!("  net investment    {:>12}\n", fmt_eur(b.capex.net)));
    out.push_str(&format!(
        "  financing         {:>12}  (loan {}, {:.2}/a)\n",
        fmt_eur(b.capex.interest),
        fmt_eur(b.capex.loan),
        b.capex.annual_payment
    ));

    out.push_str("\nOPEX (discounted totals):\n");
    for (label, value) in [
        ("energy", b.opex.energy),
        ("carbon", b.opex.carbon),
        ("maintenance", b.opex.maintenance),
        ("toll", b.opex.toll),
        ("tax", b.opex.tax),
        ("insurance", b.opex.insurance),
        ("labor", b.opex.labor),
    ] {
        let share = if b.opex.total > 0.0 {
            100.0 * value / b.opex.total
        } else {
            0.0
        };
        out.push_str(&format!(
            "  {label:<12} {:>12}  ({share:>5.1}%)\n",
            fmt_eur(value)
        ));
    }
    out.push_str(&format!("  {:<12} {:>12}\n", "total", fmt_eur(b.opex.total)));

    out.push_str("\nResidual value:\n");
    out.push_str(&format!(
        "  factors: age {:.3} x mileage {:.3} x market {:.3}{}\n",
        b.residual.age_factor,
        b.residual.mileage_factor,
        b.residual.market_factor,
        if b.residual.floored { "  [scrap floor]" } else { "" }
    ));
    out.push_str(&format!(
        "  value {} | discounted {}\n",
        fmt_eur(b.residual.value),
        fmt_eur(b.residual.discounted)
    ));

    out.push_str("\nTCO:\n");
    out.push_str(&format!("  total             {:>12}\n", fmt_eur(b.total)));
    out.push_str(&format!("  levelized         {:.4} EUR/km\n", b.eur_per_km));
    out.push_str(&format!("  levelized         {:.5} EUR/tkm\n", b.eur_per_tkm));

    out
}

/// Format the fleet comparison tables.
pub fn format_comparison(rankings: &Rankings) -> String {
    let mut out = String::new();

    out.push_str("Cheapest (by EUR/km):\n");
    out.push_str(&format_table(&rankings.cheapest));
    out.push('\n');

    out.push_str("Priciest (by EUR/km):\n");
    out.push_str(&format_table(&rankings.priciest));

    out
}

fn format_table(rows: &[TcoBreakdown]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<4} {:<16} {:<6} {:<7} {:>12} {:>10} {:>10}\n",
        "#", "id", "kind", "drive", "total", "EUR/km", "EUR/tkm"
    ));
    for (i, b) in rows.iter().enumerate() {
        out.push_str(&format!(
            "{:<4} {:<16} {:<6} {:<7} {:>12} {:>10.4} {:>10.5}\n",
            i + 1,
            b.vehicle_id,
            b.kind.display_name(),
            b.drivetrain.display_name(),
            fmt_eur(b.total),
            b.eur_per_km,
            b.eur_per_tkm
        ));
    }
    out
}

/// Format the ingest summary line plus any row-level errors.
pub fn format_ingest_summary(fleet: &FleetData) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Fleet: {} rows read, {} used | annual km [{:.0}, {:.0}]\n",
        fleet.rows_read, fleet.rows_used, fleet.stats.km_min, fleet.stats.km_max
    ));
    for e in &fleet.row_errors {
        match &e.id {
            Some(id) => out.push_str(&format!("  (line {}, {}) {}\n", e.line, id, e.message)),
            None => out.push_str(&format!("  (line {}) {}\n", e.line, e.message)),
        }
    }
    out
}

/// Format the Monte Carlo sensitivity block.
pub fn format_sensitivity(mc: &McSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("Sensitivity ({} runs):\n", mc.runs));
    out.push_str(&format!(
        "  total   mean {} | p10 {} | p50 {} | p90 {}\n",
        fmt_eur(mc.mean_total),
        fmt_eur(mc.p10_total),
        fmt_eur(mc.p50_total),
        fmt_eur(mc.p90_total)
    ));
    out.push_str(&format!(
        "  EUR/km  mean {:.4} | p10 {:.4} | p50 {:.4} | p90 {:.4}\n",
        mc.mean_eur_per_km, mc.p10_eur_per_km, mc.p50_eur_per_km, mc.p90_eur_per_km
    ));
    out
}

/// Format a EUR amount with thousands separators (reports only).
pub fn fmt_eur(v: f64) -> String {
    let negative = v < 0.0;
    let rounded = v.abs().round() as u64;
    let digits = rounded.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('_');
        }
        grouped.push(c);
    }
    format!("{}{} EUR", if negative { "-" } else { "" }, grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::compute_tco;
    use crate::data::builtin_de;
    use crate::domain::{AssetKind, Drivetrain, TcoConfig, VehicleRecord};

    fn breakdown() -> TcoBreakdown {
        let v = VehicleRecord {
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
        };
        compute_tco(&v, &builtin_de(), &TcoConfig::default()).unwrap()
    }

    #[test]
    fn fmt_eur_groups_thousands() {
        assert_eq!(fmt_eur(1_234_567.4), "1_234_567 EUR");
        assert_eq!(fmt_eur(-950.0), "-950 EUR");
        assert_eq!(fmt_eur(0.2), "0 EUR");
    }

    #[test]
    fn run_summary_mentions_key_blocks() {
        let text = format_run_summary(&breakdown());
        assert!(text.contains("CAPEX"));
        assert!(text.contains("Residual value"));
        assert!(text.contains("EUR/km"));
        assert!(text.contains("dsl-40t"));
    }

    #[test]
    fn comparison_lists_rows_in_order() {
        let rankings = crate::report::rank_by_unit_cost(&[breakdown()], 5);
        let text = format_comparison(&rankings);
        assert!(text.contains("Cheapest"));
        assert!(text.contains("dsl-40t"));
    }
}
