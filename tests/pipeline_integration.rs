//! End-to-end tests of the trend pipeline, from CSV bytes to export.

use anofox_trends::prelude::*;
use anofox_trends::report::{DELAYED_LABEL, IMMEDIATE_LABEL};
use approx::assert_relative_eq;
use chrono::NaiveDate;

fn day(d: u32) -> Value {
    Value::Date(
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
    )
}

fn three_days() -> Dataset {
    load_csv(b"date,x\n2024-01-01,10\n2024-01-02,20\n2024-01-03,15\n")
}

#[test]
fn short_trend_of_three_days() {
    let config = TrendConfig::new("date", ["x"])
        .with_windows(2, 3)
        .with_min_periods(2);

    let output = compute(&config, &three_days()).unwrap();
    let tc = output.report.short_trend("x").unwrap();

    // rolling medians: undefined, 15, 17.5 ; adjusted ewm with alpha = 2/3
    assert!(tc[0].is_nan());
    assert_relative_eq!(tc[1], 15.0, epsilon = 1e-10);
    assert_relative_eq!(tc[2], (15.0 / 3.0 + 17.5) / (4.0 / 3.0), epsilon = 1e-10);

    assert_eq!(
        output.report.table().column("date").unwrap(),
        vec![&day(1), &day(2), &day(3)]
    );
}

#[test]
fn unsorted_input_gives_the_same_trend() {
    let shuffled = load_csv(b"date,x\n2024-01-03,15\n2024-01-01,10\n2024-01-02,20\n");
    let config = TrendConfig::new("date", ["x"]).with_windows(2, 3);

    let sorted = compute(&config, &three_days()).unwrap();
    let unsorted = compute(&config, &shuffled).unwrap();

    assert_eq!(sorted.report, unsorted.report);
    // the export follows the input order
    assert_eq!(
        unsorted.export.table().value(0, "x"),
        Some(&Value::Number(15.0))
    );
    assert_eq!(
        unsorted.export.table().value(0, "x_tc"),
        sorted.export.table().value(2, "x_tc")
    );
}

#[test]
fn entities_do_not_leak_into_each_other() {
    let csv = b"athlete,date,load\n\
        Ana,2024-01-01,10\n\
        Ben,2024-01-01,1000\n\
        Ana,2024-01-02,20\n\
        Ben,2024-01-02,3000\n\
        Ana,2024-01-03,15\n";
    let dataset = load_csv(csv);
    let config = TrendConfig::new("date", ["load"])
        .with_entity("athlete")
        .with_windows(2, 4);

    let output = compute(&config, &dataset).unwrap();

    let ana = output.curves.get(Some("Ana"), "load").unwrap();
    assert_eq!(ana.title, "Ana - load");
    assert_eq!(ana.y, vec![10.0, 20.0, 15.0]);
    assert!(ana.y1[0].is_nan());
    assert_relative_eq!(ana.y1[1], 15.0, epsilon = 1e-10);
    // plain ewm: 1/3 * 15 + 2/3 * 17.5
    assert_relative_eq!(ana.y1[2], 50.0 / 3.0, epsilon = 1e-10);
    assert!(ana.y1.iter().chain(&ana.y2).all(|t| t.is_nan() || *t < 100.0));

    let ben = output.curves.get(Some("Ben"), "load").unwrap();
    assert_relative_eq!(ben.y1[1], 2000.0, epsilon = 1e-10);

    assert_eq!(output.curves.entities(), &["Ana", "Ben"]);
    assert_eq!(output.export.len(), 5);
}

#[test]
fn daily_sum_and_median() {
    let csv = b"date,load,rpe,session\n\
        2024-01-01,4,4,am\n\
        2024-01-01,10,10,pm\n\
        2024-01-02,5,6,am\n";
    let dataset = load_csv(csv);
    let config = TrendConfig::new("date", ["load", "rpe"])
        .with_group_by_date(true)
        .with_aggregation("load", Aggregation::Sum)
        .with_aggregation("rpe", Aggregation::Median)
        .with_windows(1, 1);

    let output = compute(&config, &dataset).unwrap();

    assert_eq!(output.report.len(), 2);
    assert_eq!(
        output.report.table().numeric_column("load").unwrap(),
        vec![14.0, 5.0]
    );
    assert_eq!(
        output.report.table().numeric_column("rpe").unwrap(),
        vec![7.0, 6.0]
    );

    let export = output.export.table();
    assert_eq!(
        export.columns(),
        &[
            "date", "load", "rpe", "session", "load_agg", "load_tc", "load_tl", "rpe_agg",
            "rpe_tc", "rpe_tl"
        ]
    );
    assert_eq!(export.len(), 3);
    assert_eq!(export.value(0, "load_agg"), Some(&Value::Number(14.0)));
    assert_eq!(export.value(1, "load_agg"), Some(&Value::Number(14.0)));
    assert_eq!(export.value(1, "rpe_agg"), Some(&Value::Number(7.0)));
    assert_eq!(export.value(1, "load"), Some(&Value::Number(10.0)));
}

#[test]
fn repeated_runs_are_byte_identical() {
    let config = TrendConfig::new("date", ["x"]).with_windows(2, 3);
    let dataset = three_days();

    let first = compute(&config, &dataset).unwrap();
    let second = compute(&config, &dataset).unwrap();

    assert_eq!(first, second);
    assert_eq!(
        first.export.to_csv_bytes().unwrap(),
        second.export.to_csv_bytes().unwrap()
    );
}

#[test]
fn export_csv_has_header_and_empty_missing_cells() {
    let config = TrendConfig::new("date", ["x"])
        .with_windows(2, 3)
        .with_min_periods(2);
    let output = compute(&config, &three_days()).unwrap();

    let text = String::from_utf8(output.export.to_csv_bytes().unwrap()).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "date,x,x_tc,x_tl");
    assert_eq!(lines[1], "2024-01-01,10,,");
    assert_eq!(lines[2], "2024-01-02,20,15,15");
    assert_eq!(lines.len(), 4);
}

#[test]
fn bad_date_is_a_parse_error() {
    let dataset = load_csv(b"date,x\n2024-01-01,1\nnot a date,2\n");
    let config = TrendConfig::new("date", ["x"]);

    match compute(&config, &dataset) {
        Err(TrendError::DateParse { column, row, value }) => {
            assert_eq!(column, "date");
            assert_eq!(row, 1);
            assert_eq!(value, "not a date");
        }
        other => panic!("expected a date parse error, got {:?}", other),
    }
}

#[test]
fn text_in_feature_column_is_rejected() {
    let dataset = load_csv(b"date,x\n2024-01-01,1\n2024-01-02,lots\n");
    let config = TrendConfig::new("date", ["x"]);

    assert!(matches!(
        compute(&config, &dataset),
        Err(TrendError::NonNumeric { .. })
    ));
}

#[test]
fn invalid_config_is_rejected() {
    let config = TrendConfig::new("date", ["x"])
        .with_group_by_date(true)
        .with_windows(2, 3);

    assert!(matches!(
        compute(&config, &three_days()),
        Err(TrendError::InvalidConfig(_))
    ));
}

#[test]
fn unreadable_input_is_nothing_to_compute() {
    let dataset = load_csv(b"");
    assert!(dataset.is_empty());

    let config = TrendConfig::new("date", ["x"]);
    let output = compute(&config, &dataset).unwrap();
    assert!(output.report.is_empty());
    assert!(output.export.is_empty());
    assert!(output.curves.is_empty());
}

#[test]
fn missing_values_are_skipped_by_the_median() {
    let dataset = load_csv(b"date,x\n2024-01-01,10\n2024-01-02,NA\n2024-01-03,20\n");
    let config = TrendConfig::new("date", ["x"]).with_windows(3, 3);

    let output = compute(&config, &dataset).unwrap();
    let tc = output.report.short_trend("x").unwrap();

    assert_relative_eq!(tc[0], 10.0, epsilon = 1e-10);
    assert_relative_eq!(tc[1], 10.0, epsilon = 1e-10);
    // median of {10, 20}, then adjusted ewm with alpha = 1/2
    assert_relative_eq!(
        tc[2],
        (0.25 * 10.0 + 0.5 * 10.0 + 15.0) / 1.75,
        epsilon = 1e-10
    );
    assert_eq!(output.export.table().value(1, "x"), Some(&Value::Null));
}

#[test]
fn curve_labels_and_config_file_round_trip() {
    assert_eq!(IMMEDIATE_LABEL, "Immediate effects");
    assert_eq!(DELAYED_LABEL, "Delayed cumulative effects");

    let config = TrendConfig::from_toml_str(
        r#"
        date_column = "date"
        feature_columns = ["x"]
        short_window = 2
        long_window = 3
        "#,
    )
    .unwrap();

    let output = compute(&config, &three_days()).unwrap();
    let curve = output.curves.get(None, "x").unwrap();
    assert_eq!(curve.x.len(), 3);
    assert_eq!(curve.y2.len(), 3);
}

#[test]
fn window_longer_than_the_data_is_fine() {
    let config = TrendConfig::new("date", ["x"]).with_windows(2, 1usize << 40);

    let output = compute(&config, &three_days()).unwrap();
    let tl = output.report.long_trend("x").unwrap();

    assert_eq!(tl.len(), 3);
    assert!(tl.iter().all(|t| t.is_finite()));
}

#[test]
fn workbook_input_runs_through_the_pipeline() {
    let dataset = load_table(include_bytes!("data/team_log.xlsx"));
    let config = TrendConfig::new("date", ["load"])
        .with_entity("athlete")
        .with_windows(1, 1);

    let output = compute(&config, &dataset).unwrap();

    assert_eq!(output.curves.entities(), &["Ana", "Ben"]);
    let ana = output.curves.get(Some("Ana"), "load").unwrap();
    assert_eq!(ana.y1, vec![10.0, 20.0]);
    // a missing day repeats the previous trend value
    let ben = output.curves.get(Some("Ben"), "load").unwrap();
    assert_eq!(ben.y1, vec![7.5, 7.5]);

    let text = String::from_utf8(output.export.to_csv_bytes().unwrap()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "athlete,date,load,load_tc,load_tl");
    assert_eq!(lines[1], "Ana,2024-01-01,10,10,10");
}
