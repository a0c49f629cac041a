//! CSV ingest into a [`Dataset`], with workbook fallback.

use super::spreadsheet::{is_workbook, try_load_spreadsheet};
use crate::core::{Dataset, Value};
use crate::error::{Result, TrendError};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Cell spellings read as missing values.
const MISSING_TOKENS: [&str; 7] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL"];

/// Load a CSV byte stream, degrading to an empty dataset on any failure.
///
/// An empty result means "no data loaded"; callers should not treat it as
/// an error.
pub fn load_csv(bytes: &[u8]) -> Dataset {
    match try_load_csv(bytes) {
        Ok(dataset) => dataset,
        Err(err) => {
            log::warn!("could not load dataset, continuing with an empty table: {}", err);
            Dataset::empty()
        }
    }
}

/// Load a CSV byte stream with a header row.
///
/// Blank header names become `Unnamed: <position>` and repeated names get a
/// `.1`, `.2`, ... suffix. Cells are inferred one by one: missing tokens
/// become [`Value::Null`], numbers [`Value::Number`], anything else
/// [`Value::Text`].
pub fn try_load_csv(bytes: &[u8]) -> Result<Dataset> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| TrendError::Load(e.to_string()))?
        .clone();
    if headers.is_empty() {
        return Err(TrendError::Load("no header row".to_string()));
    }
    let columns = dedupe_headers(headers.iter());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| TrendError::Load(e.to_string()))?;
        rows.push(record.iter().map(parse_cell).collect());
    }

    log::debug!("loaded {} rows x {} columns", rows.len(), columns.len());
    Dataset::new(columns, rows).map_err(|e| TrendError::Load(e.to_string()))
}

/// Load a CSV file.
pub fn load_csv_file(path: impl AsRef<Path>) -> Result<Dataset> {
    let bytes = fs::read(path)?;
    try_load_csv(&bytes)
}

/// Load CSV or workbook bytes, degrading to an empty dataset on any failure.
pub fn load_table(bytes: &[u8]) -> Dataset {
    match try_load_table(bytes) {
        Ok(dataset) => dataset,
        Err(err) => {
            log::warn!(
                "could not load dataset, continuing with an empty table: {}",
                err
            );
            Dataset::empty()
        }
    }
}

/// Load CSV or workbook bytes.
///
/// Workbook containers are recognized by their leading bytes. Anything else
/// is read as CSV first and as a workbook if that fails; the CSV error is
/// reported when both fail.
pub fn try_load_table(bytes: &[u8]) -> Result<Dataset> {
    if is_workbook(bytes) {
        return try_load_spreadsheet(bytes);
    }
    try_load_csv(bytes)
        .or_else(|csv_err| try_load_spreadsheet(bytes).map_err(|_| csv_err))
}

/// Load a CSV or workbook file.
pub fn load_table_file(path: impl AsRef<Path>) -> Result<Dataset> {
    let bytes = fs::read(path)?;
    try_load_table(&bytes)
}

/// Infer the value of a single raw cell.
pub fn parse_cell(raw: &str) -> Value {
    let trimmed = raw.trim();
    if MISSING_TOKENS.contains(&trimmed) {
        return Value::Null;
    }
    match trimmed.parse::<f64>() {
        Ok(x) if !x.is_nan() => Value::Number(x),
        _ => Value::Text(raw.to_string()),
    }
}

pub(super) fn dedupe_headers<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut columns: Vec<String> = Vec::new();

    for (pos, raw) in headers.enumerate() {
        let base = if raw.trim().is_empty() {
            format!("Unnamed: {}", pos)
        } else {
            raw.to_string()
        };

        let mut name = base.clone();
        while columns.contains(&name) {
            let n = seen.entry(base.clone()).or_insert(0);
            *n += 1;
            name = format!("{}.{}", base, n);
        }
        columns.push(name);
    }
    columns
}
