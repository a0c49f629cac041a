//! Property-based tests for the trend pipeline.
//!
//! These tests verify invariants that should hold for all valid inputs,
//! using randomly generated tables.

use anofox_trends::core::{Dataset, Value};
use anofox_trends::io::{load_csv, write_csv};
use anofox_trends::prelude::*;
use anofox_trends::transform::{median_ewm_trend, rolling_median};
use anofox_trends::utils::successive_difference_variance;
use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

fn date_cell(offset: i64) -> Value {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    Value::Text((base + Duration::days(offset)).format("%Y-%m-%d").to_string())
}

/// Strategy for (day offset, value) rows in arbitrary order.
fn rows_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<(i64, f64)>> {
    prop::collection::vec((0..60_i64, 0.0..500.0_f64), min_len..max_len)
}

/// Strategy for (entity, day offset, value) rows.
fn entity_rows_strategy(max_len: usize) -> impl Strategy<Value = Vec<(usize, i64, f64)>> {
    prop::collection::vec((0..3_usize, 0..60_i64, 0.0..500.0_f64), 1..max_len)
}

fn dataset(rows: &[(i64, f64)]) -> Dataset {
    let cells = rows
        .iter()
        .map(|&(d, x)| vec![date_cell(d), Value::Number(x)])
        .collect();
    Dataset::new(vec!["date".to_string(), "x".to_string()], cells).unwrap()
}

fn entity_dataset(rows: &[(usize, i64, f64)]) -> Dataset {
    let names = ["Ana", "Ben", "Cai"];
    let cells = rows
        .iter()
        .map(|&(e, d, x)| vec![Value::from(names[e]), date_cell(d), Value::Number(x)])
        .collect();
    Dataset::new(
        vec!["athlete".to_string(), "date".to_string(), "x".to_string()],
        cells,
    )
    .unwrap()
}

/// Strategy for a smooth trending series with noise.
fn noisy_series_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    (min_len..max_len).prop_flat_map(|len| {
        (
            0.0..100.0_f64,
            0.1..2.0_f64,
            prop::collection::vec(-20.0..20.0_f64, len),
        )
            .prop_map(|(base, slope, noise)| {
                noise
                    .iter()
                    .enumerate()
                    .map(|(i, n)| base + slope * i as f64 + n)
                    .collect()
            })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn report_is_sorted_by_date(rows in rows_strategy(1, 40)) {
        let config = TrendConfig::new("date", ["x"]).with_windows(3, 7);
        let output = compute(&config, &dataset(&rows)).unwrap();

        let dates = output.report.dates().unwrap();
        prop_assert_eq!(dates.len(), rows.len());
        for pair in dates.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn export_keeps_every_input_row(rows in rows_strategy(1, 40)) {
        let config = TrendConfig::new("date", ["x"])
            .with_group_by_date(true)
            .with_aggregation("x", Aggregation::Sum)
            .with_windows(2, 5);
        let ds = dataset(&rows);
        let output = compute(&config, &ds).unwrap();

        // one report row per date, so the left join never fans out
        prop_assert_eq!(output.export.len(), ds.len());
        for (i, &(_, x)) in rows.iter().enumerate() {
            prop_assert_eq!(output.export.table().value(i, "x"), Some(&Value::Number(x)));
        }
    }

    #[test]
    fn entity_trend_ignores_other_entities(rows in entity_rows_strategy(40)) {
        let config = TrendConfig::new("date", ["x"])
            .with_entity("athlete")
            .with_windows(2, 4);
        let all = compute(&config, &entity_dataset(&rows)).unwrap();

        let ana_only: Vec<(usize, i64, f64)> =
            rows.iter().copied().filter(|&(e, _, _)| e == 0).collect();
        prop_assume!(!ana_only.is_empty());
        let alone = compute(&config, &entity_dataset(&ana_only)).unwrap();

        let a = all.curves.get(Some("Ana"), "x").unwrap();
        let b = alone.curves.get(Some("Ana"), "x").unwrap();
        prop_assert_eq!(&a.x, &b.x);
        prop_assert_eq!(a.y1.len(), b.y1.len());
        for (p, q) in a.y1.iter().zip(&b.y1).chain(a.y2.iter().zip(&b.y2)) {
            prop_assert!((p.is_nan() && q.is_nan()) || (p - q).abs() < 1e-9);
        }
    }

    #[test]
    fn trend_stays_within_observed_range(
        series in noisy_series_strategy(2, 60),
        window in 1..10_usize,
    ) {
        let trend = median_ewm_trend(&series, window, 1, true);
        let lo = series.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = series.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        prop_assert_eq!(trend.len(), series.len());
        for t in trend {
            prop_assert!(t.is_finite());
            prop_assert!(t >= lo - 1e-9 && t <= hi + 1e-9);
        }
    }

    #[test]
    fn long_window_is_smoother(series in noisy_series_strategy(40, 80)) {
        let short = median_ewm_trend(&series, 3, 1, true);
        let long = median_ewm_trend(&series, 21, 1, true);

        prop_assert!(
            successive_difference_variance(&long) <= successive_difference_variance(&short) + 1e-9
        );
    }

    #[test]
    fn rolling_median_defined_after_min_periods(
        series in noisy_series_strategy(1, 30),
        window in 1..8_usize,
    ) {
        let min_periods = 2.min(window);
        let medians = rolling_median(&series, window, min_periods);
        for (i, m) in medians.iter().enumerate() {
            prop_assert_eq!(m.is_nan(), i + 1 < min_periods);
        }
    }

    #[test]
    fn exported_csv_reloads_with_same_values(rows in rows_strategy(1, 30)) {
        let config = TrendConfig::new("date", ["x"]).with_windows(2, 5);
        let output = compute(&config, &dataset(&rows)).unwrap();

        let mut bytes = Vec::new();
        write_csv(output.export.table(), &mut bytes).unwrap();
        let reloaded = load_csv(&bytes);

        prop_assert_eq!(reloaded.columns(), output.export.columns());
        prop_assert_eq!(reloaded.len(), output.export.len());
        let before = output.export.table().numeric_column("x_tl").unwrap();
        let after = reloaded.numeric_column("x_tl").unwrap();
        for (p, q) in before.iter().zip(&after) {
            prop_assert!((p.is_nan() && q.is_nan()) || p == q);
        }
    }
}
