//! Immediate and delayed trend computation.

use crate::config::TrendConfig;
use crate::core::{Dataset, GroupKey, Schema, Value};
use crate::error::Result;
use crate::transform::median_ewm_trend;
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// Name of the immediate (short window) trend column for a feature.
pub fn short_trend_column(feature: &str) -> String {
    format!("{}_tc", feature)
}

/// Name of the delayed cumulative (long window) trend column for a feature.
pub fn long_trend_column(feature: &str) -> String {
    format!("{}_tl", feature)
}

/// Name under which an aggregated daily value is exported.
pub fn aggregated_column(feature: &str) -> String {
    format!("{}_agg", feature)
}

/// Normalized table augmented with `<feature>_tc` and `<feature>_tl` columns.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendReport {
    table: Dataset,
    date_column: String,
    entity_column: Option<String>,
    features: Vec<String>,
    aggregated: bool,
}

impl TrendReport {
    /// A report with no rows, as produced for an empty dataset.
    pub fn empty(config: &TrendConfig) -> Self {
        Self {
            table: Dataset::empty(),
            date_column: config.date_column.clone(),
            entity_column: config.entity_column.clone(),
            features: config.feature_columns.clone(),
            aggregated: config.group_by_date,
        }
    }

    pub fn table(&self) -> &Dataset {
        &self.table
    }

    pub fn into_table(self) -> Dataset {
        self.table
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn date_column(&self) -> &str {
        &self.date_column
    }

    pub fn entity_column(&self) -> Option<&str> {
        self.entity_column.as_deref()
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// True when feature values are daily aggregates rather than raw rows.
    pub fn is_aggregated(&self) -> bool {
        self.aggregated
    }

    /// Keys joining this report back to the raw dataset.
    pub fn join_keys(&self) -> Vec<String> {
        match &self.entity_column {
            Some(entity) => vec![entity.clone(), self.date_column.clone()],
            None => vec![self.date_column.clone()],
        }
    }

    /// Report dates, top to bottom.
    pub fn dates(&self) -> Result<Vec<Option<NaiveDateTime>>> {
        Ok(self
            .table
            .column(&self.date_column)?
            .into_iter()
            .map(Value::as_date)
            .collect())
    }

    /// Immediate trend of one feature (`NaN` where undefined).
    pub fn short_trend(&self, feature: &str) -> Result<Vec<f64>> {
        self.table.numeric_column(&short_trend_column(feature))
    }

    /// Delayed cumulative trend of one feature (`NaN` where undefined).
    pub fn long_trend(&self, feature: &str) -> Result<Vec<f64>> {
        self.table.numeric_column(&long_trend_column(feature))
    }
}

/// Add immediate and delayed trend columns for every feature.
///
/// Each trend is a trailing rolling median followed by a span-based
/// exponentially weighted mean, both with the configured window length.
/// With an entity column every entity is smoothed on its own rows only;
/// rows without an entity value get no trend.
pub fn smooth(table: Dataset, schema: &Schema, config: &TrendConfig) -> Result<TrendReport> {
    let groups = entity_groups(&table, schema);
    let min_periods = config.min_periods();
    let adjust = config.adjust_ewm();

    let mut table = table;
    for feature in schema.features() {
        let values: Vec<f64> = table
            .rows()
            .iter()
            .map(|row| row[feature.index].to_f64_or_nan())
            .collect();

        let short = smooth_groups(&values, &groups, config.short_window, min_periods, adjust);
        let long = smooth_groups(&values, &groups, config.long_window, min_periods, adjust);

        table.set_column(&short_trend_column(&feature.name), into_values(short))?;
        table.set_column(&long_trend_column(&feature.name), into_values(long))?;
    }

    log::debug!(
        "smoothed {} features over {} rows in {} groups (short = {}, long = {}, min_periods = {})",
        schema.features().len(),
        table.len(),
        groups.len(),
        config.short_window,
        config.long_window,
        min_periods
    );

    Ok(TrendReport {
        table,
        date_column: schema.date_name().to_string(),
        entity_column: schema.entity_name().map(str::to_string),
        features: schema.features().iter().map(|f| f.name.clone()).collect(),
        aggregated: config.group_by_date,
    })
}

/// Row indices of each entity, in order of first appearance.
///
/// Without an entity column the whole table is a single group.
fn entity_groups(table: &Dataset, schema: &Schema) -> Vec<Vec<usize>> {
    let Some(entity_idx) = schema.entity_index() else {
        return vec![(0..table.len()).collect()];
    };

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut lookup: HashMap<GroupKey, usize> = HashMap::new();
    for (i, row) in table.rows().iter().enumerate() {
        if let Some(key) = row[entity_idx].group_key() {
            let slot = *lookup.entry(key).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(i);
        }
    }
    groups
}

fn smooth_groups(
    values: &[f64],
    groups: &[Vec<usize>],
    window: usize,
    min_periods: usize,
    adjust: bool,
) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    for members in groups {
        let series: Vec<f64> = members.iter().map(|&i| values[i]).collect();
        let trend = median_ewm_trend(&series, window, min_periods, adjust);
        for (&i, t) in members.iter().zip(trend) {
            result[i] = t;
        }
    }
    result
}

fn into_values(series: Vec<f64>) -> Vec<Value> {
    series
        .into_iter()
        .map(|x| if x.is_nan() { Value::Null } else { Value::Number(x) })
        .collect()
}
