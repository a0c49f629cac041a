//! The trend report pipeline: normalize, smooth, merge.
//!
//! # Example
//!
//! ```
//! use anofox_trends::config::TrendConfig;
//! use anofox_trends::io::load_csv;
//! use anofox_trends::report::compute;
//!
//! let dataset = load_csv(b"date,x\n2024-01-01,10\n2024-01-02,20\n2024-01-03,15\n");
//! let config = TrendConfig::new("date", ["x"]).with_windows(2, 3);
//!
//! let output = compute(&config, &dataset).unwrap();
//! assert_eq!(output.report.len(), 3);
//! assert_eq!(output.export.len(), 3);
//! assert!(output.curves.get(None, "x").is_some());
//! ```

pub mod curves;
pub mod merge;
pub mod normalize;
pub mod smooth;

pub use curves::{build_curves, CurveKey, TrendCurve, TrendCurves, DELAYED_LABEL, IMMEDIATE_LABEL};
pub use merge::{merge, ExportTable, DEFAULT_EXPORT_FILE_NAME};
pub use normalize::normalize;
pub use smooth::{aggregated_column, long_trend_column, short_trend_column, smooth, TrendReport};

use crate::config::TrendConfig;
use crate::core::{Dataset, Schema};
use crate::error::Result;

/// Everything one report run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutput {
    /// Normalized table with trend columns.
    pub report: TrendReport,
    /// Raw dataset joined with the trends.
    pub export: ExportTable,
    /// Chart bundles per (entity, feature).
    pub curves: TrendCurves,
}

impl ReportOutput {
    /// Output of a run over an empty dataset.
    pub fn empty(config: &TrendConfig) -> Self {
        Self {
            report: TrendReport::empty(config),
            export: ExportTable::default(),
            curves: TrendCurves::default(),
        }
    }
}

/// Run the whole pipeline on `dataset`.
///
/// The configuration is validated and the columns resolved before anything
/// is computed, so a failing run leaves nothing half done. The input is
/// never modified and every call recomputes from scratch. An empty dataset
/// yields an empty output.
pub fn compute(config: &TrendConfig, dataset: &Dataset) -> Result<ReportOutput> {
    config.validate()?;

    if dataset.is_empty() {
        log::info!("no data loaded, nothing to compute");
        return Ok(ReportOutput::empty(config));
    }

    let schema = Schema::resolve(config, dataset)?;
    log::info!(
        "computing trends for {} rows, {} features (short = {}, long = {}, grouped = {})",
        dataset.len(),
        schema.features().len(),
        config.short_window,
        config.long_window,
        config.is_grouped()
    );
    let normalized = normalize(dataset, &schema, config)?;

    let schema = Schema::resolve(config, &normalized)?;
    let report = smooth(normalized, &schema, config)?;

    let export = merge(dataset, &report, &report.join_keys())?;
    let curves = build_curves(&report)?;

    log::info!(
        "trend report ready: {} input rows, {} report rows, {} export rows, {} curves",
        dataset.len(),
        report.len(),
        export.len(),
        curves.len()
    );

    Ok(ReportOutput {
        report,
        export,
        curves,
    })
}
