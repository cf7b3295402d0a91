//! Geography reference ingest.
//!
//! The geography file maps postal codes onto (region, country) tuples. It is
//! loaded once per run into an ordered table and passed by reference; nothing
//! downstream mutates or reloads it.

use std::fs::File;
use std::path::Path;

use crate::domain::{GeoRow, GeographyTable};
use crate::error::AppError;
use crate::io::{build_header_map, get_field, pick_column};

const POSTAL_COLUMNS: [&str; 4] = ["zip", "postal code", "postal_code", "zipcode"];
const REGION_COLUMNS: [&str; 3] = ["state", "region", "main division"];
const COUNTRY_COLUMNS: [&str; 1] = ["country"];

/// Country assumed when the reference file has no country column.
const DEFAULT_TABLE_COUNTRY: &str = "US";

/// Load the geography table from a CSV file.
///
/// Rows missing either the postal code or the region are skipped; a missing
/// file or missing required columns are fatal.
pub fn read_geography_table(path: &Path) -> Result<GeographyTable, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::input(format!("Failed to open geography file '{}': {e}", path.display()))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read geography headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let postal_idx = pick_column(&header_map, &POSTAL_COLUMNS).ok_or_else(|| {
        AppError::input(format!(
            "Geography file '{}' has no postal code column (expected one of: {}).",
            path.display(),
            POSTAL_COLUMNS.join(", ")
        ))
    })?;
    let region_idx = pick_column(&header_map, &REGION_COLUMNS).ok_or_else(|| {
        AppError::input(format!(
            "Geography file '{}' has no region column (expected one of: {}).",
            path.display(),
            REGION_COLUMNS.join(", ")
        ))
    })?;
    let country_idx = pick_column(&header_map, &COUNTRY_COLUMNS);

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.map_err(|e| {
            AppError::input(format!("Geography parse error at line {line}: {e}"))
        })?;

        let (Some(postal), Some(region)) = (get_field(&record, postal_idx), get_field(&record, region_idx))
        else {
            continue;
        };

        let country = country_idx
            .and_then(|i| get_field(&record, i))
            .unwrap_or(DEFAULT_TABLE_COUNTRY);

        rows.push((
            postal.to_string(),
            GeoRow {
                region: region.to_uppercase(),
                country: country.to_uppercase(),
            },
        ));
    }

    Ok(GeographyTable::from_rows(rows))
}
