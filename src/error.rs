//! Error types for the anofox-trends library.

use thiserror::Error;

/// Result type alias for trend operations.
pub type Result<T> = std::result::Result<T, TrendError>;

/// Errors that can occur while loading, configuring, computing or exporting a report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrendError {
    /// Input bytes could not be read as a supported tabular format.
    #[error("failed to load dataset: {0}")]
    Load(String),

    /// A date cell could not be parsed.
    #[error("cannot parse '{value}' in column '{column}' (row {row}) as a date")]
    DateParse {
        column: String,
        row: usize,
        value: String,
    },

    /// The trend configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configured column does not exist in the dataset.
    #[error("column not found: {0}")]
    MissingColumn(String),

    /// A feature column holds a value that is not numeric.
    #[error("column '{column}' holds a non-numeric value at row {row}: '{value}'")]
    NonNumeric {
        column: String,
        row: usize,
        value: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Configuration file could not be parsed or written.
    #[error("configuration error: {0}")]
    Config(String),

    /// CSV encoding failure during export.
    #[error("csv error: {0}")]
    Csv(String),

    /// Underlying I/O failure.
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TrendError {
    fn from(err: std::io::Error) -> Self {
        TrendError::Io(err.to_string())
    }
}

impl From<csv::Error> for TrendError {
    fn from(err: csv::Error) -> Self {
        TrendError::Csv(err.to_string())
    }
}
