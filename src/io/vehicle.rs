//! Read a single vehicle record from JSON.

use std::fs::File;
use std::path::Path;

use crate::domain::VehicleRecord;
use crate::error::AppError;

/// Read and validate a vehicle JSON file.
pub fn read_vehicle_json(path: &Path) -> Result<VehicleRecord, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::input(format!("Failed to open vehicle JSON '{}': {e}", path.display()))
    })?;
    let vehicle: VehicleRecord = serde_json::from_reader(file)
        .map_err(|e| AppError::input(format!("Invalid vehicle JSON: {e}")))?;
    vehicle
        .validate()
        .map_err(|e| AppError::input(format!("Vehicle '{}': {e}", vehicle.id)))?;
    Ok(vehicle)
}
