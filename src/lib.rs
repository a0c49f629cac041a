//! # anofox-trends
//!
//! Immediate and delayed trend lines for tabular time series.
//!
//! Each numeric feature is smoothed twice: a short trailing rolling median
//! followed by an exponentially weighted mean gives the immediate trend, the
//! same pipeline over a longer window gives the delayed cumulative trend.
//! Trends can be computed per entity (e.g. per athlete) and rows sharing a
//! date can be collapsed with a per-feature aggregation first. Results are
//! joined back onto the raw rows for export and bundled per chart.

#![allow(clippy::type_complexity)]
#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod report;
pub mod transform;
pub mod utils;

pub use error::{Result, TrendError};

pub mod prelude {
    pub use crate::config::{Aggregation, TrendConfig};
    pub use crate::core::{Dataset, DatasetBuilder, Value};
    pub use crate::error::{Result, TrendError};
    pub use crate::io::{load_csv, load_csv_file, load_table, load_table_file};
    pub use crate::report::{
        compute, ExportTable, ReportOutput, TrendCurve, TrendCurves, TrendReport,
    };
}
