//! Export per-vehicle results to CSV and breakdowns to JSON.
//!
//! The CSV export is meant to be easy to consume in spreadsheets or
//! downstream scripts; the JSON export is the full `TcoBreakdown`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::TcoBreakdown;
use crate::error::AppError;

/// Write per-vehicle component totals to a CSV file.
pub fn write_results_csv(path: &Path, breakdowns: &[TcoBreakdown]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::input(format!("Failed to create export CSV '{}': {e}", path.display()))
    })?;

    writeln!(
        file,
        "id,kind,drivetrain,holding_years,capex_gross,subsidy,capex_net,interest,\
         energy,carbon,maintenance,toll,tax,insurance,labor,opex_total,\
         residual_value,residual_discounted,total,eur_per_km,eur_per_tkm"
    )
    .map_err(|e| AppError::input(format!("Failed to write export CSV header: {e}")))?;

    for b in breakdowns {
        writeln!(
            file,
            "{},{},{},{},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.4},{:.5}",
            b.vehicle_id,
            b.kind.display_name(),
            b.drivetrain.display_name(),
            b.holding_period_years,
            b.capex.gross,
            b.capex.subsidy,
            b.capex.net,
            b.capex.interest,
            b.opex.energy,
            b.opex.carbon,
            b.opex.maintenance,
            b.opex.toll,
            b.opex.tax,
            b.opex.insurance,
            b.opex.labor,
            b.opex.total,
            b.residual.value,
            b.residual.discounted,
            b.total,
            b.eur_per_km,
            b.eur_per_tkm,
        )
        .map_err(|e| AppError::input(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

/// Write a full breakdown as pretty-printed JSON.
pub fn write_breakdown_json(path: &Path, breakdown: &TcoBreakdown) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::input(format!(
            "Failed to create breakdown JSON '{}': {e}",
            path.display()
        ))
    })?;
    serde_json::to_writer_pretty(file, breakdown)
        .map_err(|e| AppError::input(format!("Failed to write breakdown JSON: {e}")))?;
    Ok(())
}
