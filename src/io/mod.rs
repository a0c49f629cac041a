//! Reading datasets from delimited text or workbooks and writing export tables.
//!
//! # Example
//!
//! ```
//! use anofox_trends::io::{load_csv, write_csv};
//!
//! let dataset = load_csv(b"date,load\n2024-01-01,10\n2024-01-02,12\n");
//! assert_eq!(dataset.len(), 2);
//!
//! let mut out = Vec::new();
//! write_csv(&dataset, &mut out).unwrap();
//! ```

pub mod loader;
pub mod spreadsheet;
pub mod writer;

pub use loader::{
    load_csv, load_csv_file, load_table, load_table_file, parse_cell, try_load_csv,
    try_load_table,
};
pub use spreadsheet::{is_workbook, load_spreadsheet, try_load_spreadsheet};
pub use writer::write_csv;
