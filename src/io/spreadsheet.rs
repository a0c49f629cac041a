//! Workbook ingest (xlsx, xlsm, xlsb, xls, ods) into a [`Dataset`].

use super::loader::{dedupe_headers, parse_cell};
use crate::core::{Dataset, Value};
use crate::error::{Result, TrendError};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

/// Leading bytes of zip-based (xlsx, xlsm, xlsb, ods) and OLE (xls) workbooks.
const WORKBOOK_SIGNATURES: [&[u8]; 2] = [b"PK\x03\x04", b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1"];

/// True when the bytes start like a workbook container.
pub fn is_workbook(bytes: &[u8]) -> bool {
    WORKBOOK_SIGNATURES.iter().any(|sig| bytes.starts_with(sig))
}

/// Load the first worksheet of a workbook, degrading to an empty dataset on
/// any failure.
pub fn load_spreadsheet(bytes: &[u8]) -> Dataset {
    match try_load_spreadsheet(bytes) {
        Ok(dataset) => dataset,
        Err(err) => {
            log::warn!(
                "could not load workbook, continuing with an empty table: {}",
                err
            );
            Dataset::empty()
        }
    }
}

/// Load the first worksheet of a workbook.
///
/// The first row holds the headers, renamed the same way as CSV headers.
/// Numeric cells become [`Value::Number`], date-formatted cells
/// [`Value::Date`], and text goes through the same inference as a CSV cell.
pub fn try_load_spreadsheet(bytes: &[u8]) -> Result<Dataset> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| TrendError::Load(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| TrendError::Load("workbook has no worksheet".to_string()))?
        .map_err(|e| TrendError::Load(e.to_string()))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| TrendError::Load("worksheet is empty".to_string()))?;
    let names: Vec<String> = header.iter().map(|cell| cell.to_string()).collect();
    let columns = dedupe_headers(names.iter().map(String::as_str));

    let rows: Vec<Vec<Value>> = rows
        .map(|row| row.iter().map(cell_value).collect())
        .collect();

    log::debug!(
        "loaded worksheet with {} rows x {} columns",
        rows.len(),
        columns.len()
    );
    Dataset::new(columns, rows).map_err(|e| TrendError::Load(e.to_string()))
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::Int(i) => Value::Number(*i as f64),
        Data::Float(x) if x.is_nan() => Value::Null,
        Data::Float(x) => Value::Number(*x),
        Data::DateTime(dt) => dt.as_datetime().map(Value::Date).unwrap_or(Value::Null),
        other => parse_cell(&other.to_string()),
    }
}
