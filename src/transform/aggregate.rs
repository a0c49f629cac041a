//! Collapsing several observations into one value.

use crate::config::Aggregation;
use crate::utils::stats::median;

/// Aggregate the defined (non-`NaN`) values of a group.
///
/// A sum over no defined values is `0.0`; a median over none is `NaN`.
pub fn aggregate(values: &[f64], agg: Aggregation) -> f64 {
    let defined: Vec<f64> = values.iter().copied().filter(|x| !x.is_nan()).collect();
    match agg {
        Aggregation::Sum => defined.iter().sum(),
        Aggregation::Median => median(&defined),
    }
}
