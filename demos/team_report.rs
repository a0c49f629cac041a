//! Trend report for a small training log.
//!
//! Run with `RUST_LOG=debug cargo run --example team_report [data.csv|data.xlsx] [config.toml]`.

use anofox_trends::prelude::*;
use anofox_trends::report::DEFAULT_EXPORT_FILE_NAME;
use std::env;

const SAMPLE: &str = "\
athlete,date,load,rpe
Ana,2024-03-01,420,6
Ben,2024-03-01,380,5
Ana,2024-03-02,510,7
Ana,2024-03-02,150,3
Ben,2024-03-02,400,6
Ana,2024-03-03,300,5
Ben,2024-03-03,,
Ana,2024-03-04,610,8
Ben,2024-03-04,450,7
Ana,2024-03-05,380,6
Ben,2024-03-05,390,5
";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();

    let dataset = match args.first() {
        Some(path) => load_table_file(path)?,
        None => load_csv(SAMPLE.as_bytes()),
    };

    let config = match args.get(1) {
        Some(path) => TrendConfig::from_file(path)?,
        None => TrendConfig::new("date", ["load", "rpe"])
            .with_entity("athlete")
            .with_windows(2, 4)
            .with_group_by_date(true)
            .with_aggregation("load", Aggregation::Sum)
            .with_aggregation("rpe", Aggregation::Median),
    };

    println!("config:\n{}", config.to_toml_string()?);

    let output = compute(&config, &dataset)?;

    for curve in output.curves.iter() {
        println!("{}", curve.title);
        for i in 0..curve.len() {
            println!(
                "  {}  {:>8.1}  {:>8.1}  {:>8.1}",
                curve.x[i].format("%Y-%m-%d"),
                curve.y[i],
                curve.y1[i],
                curve.y2[i]
            );
        }
    }

    output.export.write_csv_file(DEFAULT_EXPORT_FILE_NAME)?;
    println!(
        "wrote {} rows x {} columns to {}",
        output.export.len(),
        output.export.columns().len(),
        DEFAULT_EXPORT_FILE_NAME
    );

    Ok(())
}
