//! Fleet CSV ingest and normalization.
//!
//! This module turns a heterogeneous fleet-list CSV into a clean set of
//! `VehicleRecord`s that are safe to hand to the calculators.
//!
//! Design goals:
//! - **Strict schema** for required fields (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no cost formulas here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{AssetKind, Drivetrain, TcoConfig, VehicleRecord};
use crate::error::AppError;

/// Columns every fleet CSV must carry.
const REQUIRED_COLUMNS: [&str; 9] = [
    "id",
    "kind",
    "drivetrain",
    "base_price",
    "gross_weight_t",
    "payload_t",
    "annual_km",
    "consumption_kwh_per_km",
    "service_life_years",
];

/// Summary stats about the vehicles actually used.
#[derive(Debug, Clone)]
pub struct FleetStats {
    pub n_vehicles: usize,
    pub km_min: f64,
    pub km_max: f64,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

/// Ingest output: validated vehicles + stats + row errors.
#[derive(Debug, Clone)]
pub struct FleetData {
    pub vehicles: Vec<VehicleRecord>,
    pub stats: FleetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load and normalize a fleet CSV, applying the config's filters.
pub fn load_fleet(path: &Path, config: &TcoConfig) -> Result<FleetData, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::input(format!("Failed to open fleet CSV '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    for column in REQUIRED_COLUMNS {
        if !header_map.contains_key(column) {
            return Err(AppError::input(format!("Missing required column: `{column}`")));
        }
    }

    let mut vehicles = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because records() starts after the header row and CSV line
        // numbers are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(vehicle) => {
                if !passes_filters(&vehicle, config) {
                    continue;
                }
                match vehicle.validate() {
                    Ok(()) => vehicles.push(vehicle),
                    Err(e) => row_errors.push(RowError {
                        line,
                        id: Some(vehicle.id.clone()),
                        message: e,
                    }),
                }
            }
            Err(e) => row_errors.push(RowError {
                line,
                id: None,
                message: e,
            }),
        }
    }

    let rows_used = vehicles.len();
    if rows_used == 0 {
        return Err(AppError::empty(
            "No valid vehicles remain after validation/filtering.",
        ));
    }

    let stats = compute_stats(&vehicles)
        .ok_or_else(|| AppError::empty("No valid vehicles remain after validation/filtering."))?;

    Ok(FleetData {
        vehicles,
        stats,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿id"). If we don't strip it, schema validation will
    // incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn passes_filters(vehicle: &VehicleRecord, config: &TcoConfig) -> bool {
    if let Some(kind) = config.filter_kind {
        if vehicle.kind != kind {
            return false;
        }
    }
    if let Some(drivetrain) = config.filter_drivetrain {
        if vehicle.drivetrain != drivetrain {
            return false;
        }
    }
    true
}

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> Result<VehicleRecord, String> {
    let id = get_required(record, header_map, "id")?.to_string();
    let kind = AssetKind::parse(get_required(record, header_map, "kind")?)?;
    let drivetrain = Drivetrain::parse(get_required(record, header_map, "drivetrain")?)?;

    let base_price = parse_f64(get_required(record, header_map, "base_price")?, "base_price")?;
    let gross_weight_t = parse_f64(
        get_required(record, header_map, "gross_weight_t")?,
        "gross_weight_t",
    )?;
    let payload_t = parse_f64(get_required(record, header_map, "payload_t")?, "payload_t")?;
    let annual_km = parse_f64(get_required(record, header_map, "annual_km")?, "annual_km")?;
    let consumption_kwh_per_km = parse_f64(
        get_required(record, header_map, "consumption_kwh_per_km")?,
        "consumption_kwh_per_km",
    )?;
    let service_life_years = get_required(record, header_map, "service_life_years")?
        .parse::<u32>()
        .map_err(|_| "Invalid `service_life_years` (expected a whole number).".to_string())?;

    let battery_capacity_kwh =
        parse_opt_f64(get_optional(record, header_map, "battery_capacity_kwh")).unwrap_or(0.0);
    let infrastructure_cost =
        parse_opt_f64(get_optional(record, header_map, "infrastructure_cost")).unwrap_or(0.0);
    let diesel_reference_price =
        parse_opt_f64(get_optional(record, header_map, "diesel_reference_price"));
    let annual_hours = parse_opt_f64(get_optional(record, header_map, "annual_hours")).unwrap_or(0.0);

    Ok(VehicleRecord {
        id,
        kind,
        drivetrain,
        base_price,
        battery_capacity_kwh,
        infrastructure_cost,
        diesel_reference_price,
        gross_weight_t,
        payload_t,
        annual_km,
        consumption_kwh_per_km,
        annual_hours,
        service_life_years,
    })
}

fn compute_stats(vehicles: &[VehicleRecord]) -> Option<FleetStats> {
    let mut km_min = f64::INFINITY;
    let mut km_max = f64::NEG_INFINITY;
    for v in vehicles {
        km_min = km_min.min(v.annual_km);
        km_max = km_max.max(v.annual_km);
    }
    if !km_min.is_finite() || !km_max.is_finite() {
        return None;
    }
    Some(FleetStats {
        n_vehicles: vehicles.len(),
        km_min,
        km_max,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_f64(s: &str, name: &str) -> Result<f64, String> {
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("Invalid `{name}` value '{s}'."))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite `{name}` value '{s}'."))
    }
}

fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let v = s?.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "id,kind,drivetrain,base_price,gross_weight_t,payload_t,annual_km,consumption_kwh_per_km,service_life_years,battery_capacity_kwh";

    fn write_csv(rows: &[&str]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        file
    }

    #[test]
    fn loads_valid_rows_and_reports_bad_ones() {
        let file = write_csv(&[
            "dsl-1,truck,diesel,120000,40,25,100000,3.1,8,",
            "bev-1,truck,bev,180000,40,25,110000,1.3,8,600",
            "bad-1,truck,warp,180000,40,25,110000,1.3,8,",
            "bad-2,truck,diesel,-5,40,25,110000,1.3,8,",
        ]);
        let fleet = load_fleet(file.path(), &TcoConfig::default()).unwrap();
        assert_eq!(fleet.rows_read, 4);
        assert_eq!(fleet.rows_used, 2);
        assert_eq!(fleet.row_errors.len(), 2);
        assert_eq!(fleet.vehicles[1].battery_capacity_kwh, 600.0);
    }

    #[test]
    fn missing_required_column_is_input_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id,kind,base_price").unwrap();
        writeln!(file, "x,truck,1").unwrap();
        let err = load_fleet(file.path(), &TcoConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn all_rows_invalid_is_empty_error() {
        let file = write_csv(&["bad,truck,diesel,0,40,25,100000,3.1,8,"]);
        let err = load_fleet(file.path(), &TcoConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn drivetrain_filter_applies() {
        let file = write_csv(&[
            "dsl-1,truck,diesel,120000,40,25,100000,3.1,8,",
            "bev-1,truck,bev,180000,40,25,110000,1.3,8,600",
        ]);
        let config = TcoConfig {
            filter_drivetrain: Some(Drivetrain::Bev),
            ..TcoConfig::default()
        };
        let fleet = load_fleet(file.path(), &config).unwrap();
        assert_eq!(fleet.rows_used, 1);
        assert_eq!(fleet.vehicles[0].id, "bev-1");
    }

    #[test]
    fn bom_header_is_normalized() {
        assert_eq!(normalize_header_name("\u{feff}Id "), "id");
    }
}
