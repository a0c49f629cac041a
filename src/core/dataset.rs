//! Row-oriented table used as input and output of the trend engine.

use super::value::Value;
use crate::error::{Result, TrendError};
use std::collections::HashSet;

/// A table of named columns and insertion-ordered rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

/// Builder for constructing a Dataset.
#[derive(Debug, Clone, Default)]
pub struct DatasetBuilder {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Append one row.
    pub fn row(mut self, row: Vec<Value>) -> Self {
        self.rows.push(row);
        self
    }

    pub fn rows(mut self, rows: Vec<Vec<Value>>) -> Self {
        self.rows.extend(rows);
        self
    }

    pub fn build(self) -> Result<Dataset> {
        Dataset::new(self.columns, self.rows)
    }
}

impl Dataset {
    /// Create a dataset, checking that column names are unique and every row
    /// has one cell per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(TrendError::InvalidParameter(format!(
                    "duplicate column name '{}'",
                    name
                )));
            }
        }

        for row in &rows {
            if row.len() != columns.len() {
                return Err(TrendError::DimensionMismatch {
                    expected: columns.len(),
                    got: row.len(),
                });
            }
        }

        Ok(Self { columns, rows })
    }

    /// A table with no columns and no rows ("no data loaded").
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell at (row, column).
    pub fn get(&self, row: usize, column: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Cell by row index and column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        self.column_index(column).and_then(|c| self.get(row, c))
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Result<Vec<&Value>> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| TrendError::MissingColumn(name.to_string()))?;
        Ok(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// A numeric column with missing cells as `NaN`.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        Ok(self
            .column(name)?
            .into_iter()
            .map(Value::to_f64_or_nan)
            .collect())
    }

    /// Append a column, or overwrite it if the name already exists.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(TrendError::DimensionMismatch {
                expected: self.rows.len(),
                got: values.len(),
            });
        }

        match self.column_index(name) {
            Some(idx) => {
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row[idx] = v;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row.push(v);
                }
            }
        }
        Ok(())
    }
}
