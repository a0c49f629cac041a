//! CSV serialization of a [`Dataset`].

use crate::core::{Dataset, Value};
use crate::error::Result;
use chrono::Timelike;
use std::io::Write;

/// Write a dataset as UTF-8, comma-separated text with a header row.
///
/// Missing values are empty fields. A column whose dates all fall on
/// midnight is written as `YYYY-MM-DD`, otherwise dates carry a time part.
pub fn write_csv<W: Write>(dataset: &Dataset, writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    let date_only: Vec<bool> = (0..dataset.width())
        .map(|c| is_date_only_column(dataset, c))
        .collect();

    wtr.write_record(dataset.columns())?;
    for row in dataset.rows() {
        let fields = row.iter().zip(&date_only).map(|(cell, &day)| match cell {
            Value::Date(d) if day => d.format("%Y-%m-%d").to_string(),
            other => other.to_string(),
        });
        wtr.write_record(fields)?;
    }
    wtr.flush()?;
    Ok(())
}

fn is_date_only_column(dataset: &Dataset, column: usize) -> bool {
    let mut any_date = false;
    for row in dataset.rows() {
        if let Value::Date(d) = &row[column] {
            if d.num_seconds_from_midnight() != 0 || d.nanosecond() != 0 {
                return false;
            }
            any_date = true;
        }
    }
    any_date
}
