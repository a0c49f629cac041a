//! Series transformations used by the trend engine.
//!
//! Provides trailing rolling windows, exponentially weighted means and
//! per-group aggregation.
//!
//! # Example
//!
//! ```
//! use anofox_trends::transform::{ewm_mean_span, rolling_median};
//!
//! let series = vec![10.0, 20.0, 15.0, 30.0];
//!
//! // Rolling median over 3 rows, defined from the second row on
//! let medians = rolling_median(&series, 3, 2);
//!
//! // Smooth the medians with a span of 3
//! let trend = ewm_mean_span(&medians, 3, false);
//! assert!(trend[0].is_nan());
//! assert!(!trend[1].is_nan());
//! ```

pub mod aggregate;
pub mod window;

pub use aggregate::aggregate;
pub use window::{
    ewm_mean, ewm_mean_span, median_ewm_trend, rolling_apply, rolling_median, span_to_alpha,
};
