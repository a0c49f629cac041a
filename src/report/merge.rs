//! Joining trends back onto the raw dataset for export.

use super::smooth::{aggregated_column, long_trend_column, short_trend_column, TrendReport};
use crate::core::{Dataset, GroupKey, Value};
use crate::error::Result;
use crate::io::write_csv;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Suggested file name for the exported table.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "data_trends.csv";

/// The raw dataset enriched with trend columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportTable {
    table: Dataset,
}

impl ExportTable {
    pub fn table(&self) -> &Dataset {
        &self.table
    }

    pub fn into_table(self) -> Dataset {
        self.table
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        self.table.columns()
    }

    /// Serialize as comma-separated UTF-8 text with a header row.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        write_csv(&self.table, writer)
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(buf)
    }

    pub fn write_csv_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        self.write_csv(BufWriter::new(file))
    }
}

/// Left-join `original` with `report` on `join_keys`.
///
/// Every original row is kept in its original order. Matching report rows
/// contribute `<feature>_tc`, `<feature>_tl` and, for date-aggregated
/// reports, `<feature>_agg`; unmatched rows get empty cells. The date key
/// column holds parsed dates so it lines up with the report. A key column
/// missing on either side matches nothing and is logged, not raised.
pub fn merge(
    original: &Dataset,
    report: &TrendReport,
    join_keys: &[String],
) -> Result<ExportTable> {
    let report_table = report.table();

    let appended = appended_columns(report);
    let appended_src: Vec<Option<usize>> = appended
        .iter()
        .map(|(_, src)| report_table.column_index(src))
        .collect();

    let mut columns = original.columns().to_vec();
    let appended_dst: Vec<usize> = appended
        .iter()
        .map(|(name, _)| match columns.iter().position(|c| c == name) {
            Some(idx) => idx,
            None => {
                columns.push(name.clone());
                columns.len() - 1
            }
        })
        .collect();

    let date_idx = original.column_index(report.date_column());
    let left_keys: Option<Vec<usize>> =
        join_keys.iter().map(|k| original.column_index(k)).collect();
    let right_keys: Option<Vec<usize>> =
        join_keys.iter().map(|k| report_table.column_index(k)).collect();

    let index = match (&left_keys, &right_keys) {
        (Some(_), Some(right)) => index_rows(report_table, right),
        _ => {
            log::warn!(
                "join keys {:?} missing from the dataset or the report; no rows will match",
                join_keys
            );
            HashMap::new()
        }
    };

    let mut rows = Vec::with_capacity(original.len());
    for cells in original.rows() {
        let mut base = cells.clone();
        if let Some(idx) = date_idx {
            if let Some(parsed) = base[idx].to_datetime() {
                base[idx] = Value::Date(parsed);
            }
        }
        base.resize(columns.len(), Value::Null);

        let matches = left_keys
            .as_ref()
            .and_then(|keys| row_key(&base, keys))
            .and_then(|key| index.get(&key));

        match matches {
            Some(report_rows) => {
                for &r in report_rows {
                    let mut row = base.clone();
                    for (src, &dst) in appended_src.iter().zip(&appended_dst) {
                        row[dst] = src
                            .map(|s| report_table.rows()[r][s].clone())
                            .unwrap_or(Value::Null);
                    }
                    rows.push(row);
                }
            }
            None => {
                for &dst in &appended_dst {
                    base[dst] = Value::Null;
                }
                rows.push(base);
            }
        }
    }

    log::debug!(
        "merged {} dataset rows with {} report rows into {} export rows",
        original.len(),
        report_table.len(),
        rows.len()
    );

    Ok(ExportTable {
        table: Dataset::new(columns, rows)?,
    })
}

/// (export name, report column) pairs appended to each dataset row.
fn appended_columns(report: &TrendReport) -> Vec<(String, String)> {
    let mut appended = Vec::with_capacity(report.features().len() * 3);
    for feature in report.features() {
        if report.is_aggregated() {
            appended.push((aggregated_column(feature), feature.clone()));
        }
        let tc = short_trend_column(feature);
        let tl = long_trend_column(feature);
        appended.push((tc.clone(), tc));
        appended.push((tl.clone(), tl));
    }
    appended
}

fn row_key(row: &[Value], keys: &[usize]) -> Option<Vec<GroupKey>> {
    keys.iter().map(|&k| row[k].group_key()).collect()
}

/// Report rows by join key, in report order.
fn index_rows(table: &Dataset, keys: &[usize]) -> HashMap<Vec<GroupKey>, Vec<usize>> {
    let mut index: HashMap<Vec<GroupKey>, Vec<usize>> = HashMap::new();
    for (i, row) in table.rows().iter().enumerate() {
        if let Some(key) = row_key(row, keys) {
            index.entry(key).or_default().push(i);
        }
    }

    let fan_out = index.values().filter(|rows| rows.len() > 1).count();
    if fan_out > 0 {
        log::warn!(
            "{} join keys occur more than once in the report; matching rows are repeated",
            fan_out
        );
    }
    index
}
