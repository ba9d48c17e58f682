//! Read/write sweep JSON files.
//!
//! Sweep JSON is the "portable" representation of a mileage sweep:
//! - vehicle identity (id, kind, drivetrain) and holding period
//! - the computed grid (annual km vs levelized EUR/km)
//!
//! The schema is defined by `domain::SweepFile`.

use std::fs::File;
use std::path::Path;

use chrono::Local;

use crate::data::CountryParams;
use crate::domain::{SweepFile, SweepGrid, VehicleRecord};
use crate::error::AppError;

/// Write a sweep JSON file.
pub fn write_sweep_json(
    path: &Path,
    vehicle: &VehicleRecord,
    params: &CountryParams,
    holding_period_years: u32,
    grid: SweepGrid,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::input(format!("Failed to create sweep JSON '{}': {e}", path.display()))
    })?;

    let sweep = SweepFile {
        tool: "tco".to_string(),
        created: Local::now().date_naive(),
        country: params.country.clone(),
        vehicle_id: vehicle.id.clone(),
        kind: vehicle.kind,
        drivetrain: vehicle.drivetrain,
        holding_period_years,
        grid,
    };

    serde_json::to_writer_pretty(file, &sweep)
        .map_err(|e| AppError::input(format!("Failed to write sweep JSON: {e}")))?;
    Ok(())
}

/// Read a sweep JSON file.
pub fn read_sweep_json(path: &Path) -> Result<SweepFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::input(format!("Failed to open sweep JSON '{}': {e}", path.display()))
    })?;
    let sweep: SweepFile = serde_json::from_reader(file)
        .map_err(|e| AppError::input(format!("Invalid sweep JSON: {e}")))?;
    if sweep.grid.annual_km.len() != sweep.grid.eur_per_km.len() {
        return Err(AppError::input(
            "Sweep JSON grid arrays have mismatched lengths.",
        ));
    }
    Ok(sweep)
}
