//! Trailing rolling windows and exponentially weighted means.
//!
//! Missing observations are `NaN`. Windows count positions, not
//! observations, so a gap still occupies a slot in the window.

use crate::utils::stats::median;

/// Compute a trailing rolling median.
///
/// # Arguments
/// * `series` - Input series (`NaN` marks a missing value)
/// * `window` - Number of trailing positions in each window
/// * `min_periods` - Defined observations required before the output is
///   defined; capped at `window`
pub fn rolling_median(series: &[f64], window: usize, min_periods: usize) -> Vec<f64> {
    rolling_apply(series, window, min_periods, median)
}

/// Generic trailing-window application over the defined values of each window.
pub fn rolling_apply<F>(series: &[f64], window: usize, min_periods: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    if series.is_empty() || window == 0 {
        return vec![f64::NAN; series.len()];
    }

    let min_periods = min_periods.clamp(1, window);
    let mut result = vec![f64::NAN; series.len()];
    let mut observed = Vec::with_capacity(window.min(series.len()));

    for i in 0..series.len() {
        let start = (i + 1).saturating_sub(window);
        observed.clear();
        observed.extend(series[start..=i].iter().copied().filter(|x| !x.is_nan()));

        if observed.len() >= min_periods {
            result[i] = f(&observed);
        }
    }

    result
}

/// Smoothing factor for a span: `alpha = 2 / (span + 1)`.
pub fn span_to_alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Compute an exponentially weighted moving average (EWMA).
///
/// # Arguments
/// * `series` - Input series (`NaN` marks a missing value)
/// * `alpha` - Smoothing factor (0 < alpha <= 1)
///   - Higher alpha = more weight on recent values
///   - alpha = 2/(span+1) for span-based specification
/// * `adjust` - If true, divide by the decaying sum of weights,
///   `sum((1-a)^i * x[t-i]) / sum((1-a)^i)`; otherwise use the plain
///   recursion `y[t] = a * x[t] + (1-a) * y[t-1]`
///
/// The first defined value seeds the average and earlier positions stay
/// `NaN`. A missing value repeats the previous output, but still ages the
/// weights of everything before it.
pub fn ewm_mean(series: &[f64], alpha: f64, adjust: bool) -> Vec<f64> {
    if series.is_empty() {
        return Vec::new();
    }

    let alpha = alpha.clamp(0.0, 1.0);
    let decay = 1.0 - alpha;
    let new_weight = if adjust { 1.0 } else { alpha };

    let mut result = Vec::with_capacity(series.len());
    let mut weighted = f64::NAN;
    let mut old_weight = 1.0;

    for &x in series {
        let observed = !x.is_nan();

        if !weighted.is_nan() {
            old_weight *= decay;
            if observed {
                if weighted != x {
                    weighted = (old_weight * weighted + new_weight * x) / (old_weight + new_weight);
                }
                if adjust {
                    old_weight += new_weight;
                } else {
                    old_weight = 1.0;
                }
            }
        } else if observed {
            weighted = x;
        }

        result.push(weighted);
    }

    result
}

/// EWMA parameterized by span instead of alpha.
pub fn ewm_mean_span(series: &[f64], span: usize, adjust: bool) -> Vec<f64> {
    ewm_mean(series, span_to_alpha(span), adjust)
}

/// Rolling median followed by a span-based EWMA with the same length.
///
/// This is the trend line the report draws for one window setting.
pub fn median_ewm_trend(
    series: &[f64],
    window: usize,
    min_periods: usize,
    adjust: bool,
) -> Vec<f64> {
    let medians = rolling_median(series, window, min_periods);
    ewm_mean_span(&medians, window, adjust)
}
