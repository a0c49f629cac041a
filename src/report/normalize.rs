//! Date parsing, chronological ordering and daily aggregation.

use crate::config::TrendConfig;
use crate::core::{Dataset, GroupKey, Schema, Value};
use crate::error::{Result, TrendError};
use crate::transform::aggregate;
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// Rows sharing an (entity, date) key.
struct DailyGroup {
    entity: Option<Value>,
    date: NaiveDateTime,
    members: Vec<usize>,
}

/// Parse the date column, sort rows by date and optionally collapse rows
/// that share a date.
///
/// The sort is stable, so rows with equal dates keep their input order.
/// With `group_by_date` the output holds `[entity?, date, features...]`,
/// one row per key, in date order; other columns are dropped. Without it
/// every column passes through and only the date cells change type.
pub fn normalize(dataset: &Dataset, schema: &Schema, config: &TrendConfig) -> Result<Dataset> {
    let dates = parse_dates(dataset, schema)?;

    let mut order: Vec<usize> = (0..dataset.len()).collect();
    order.sort_by_key(|&i| dates[i]);

    let normalized = if config.group_by_date {
        collapse_by_date(dataset, schema, config, &dates, &order)?
    } else {
        let date_idx = schema.date_index();
        let rows = order
            .iter()
            .map(|&i| {
                let mut row = dataset.rows()[i].clone();
                row[date_idx] = Value::Date(dates[i]);
                row
            })
            .collect();
        Dataset::new(dataset.columns().to_vec(), rows)?
    };

    log::debug!(
        "normalized {} input rows into {} rows (group_by_date = {})",
        dataset.len(),
        normalized.len(),
        config.group_by_date
    );

    Ok(normalized)
}

/// Parse every date cell, failing on the first one that is not a date.
fn parse_dates(dataset: &Dataset, schema: &Schema) -> Result<Vec<NaiveDateTime>> {
    let idx = schema.date_index();
    dataset
        .rows()
        .iter()
        .enumerate()
        .map(|(row, cells)| {
            cells[idx]
                .to_datetime()
                .ok_or_else(|| TrendError::DateParse {
                    column: schema.date_name().to_string(),
                    row,
                    value: cells[idx].to_string(),
                })
        })
        .collect()
}

fn collapse_by_date(
    dataset: &Dataset,
    schema: &Schema,
    config: &TrendConfig,
    dates: &[NaiveDateTime],
    order: &[usize],
) -> Result<Dataset> {
    let entity_idx = schema.entity_index();

    let mut groups: Vec<DailyGroup> = Vec::new();
    let mut lookup: HashMap<(Option<GroupKey>, NaiveDateTime), usize> = HashMap::new();
    let mut dropped = 0usize;

    for &i in order {
        let row = &dataset.rows()[i];
        let (entity, entity_key) = match entity_idx {
            Some(e) => match row[e].group_key() {
                Some(key) => (Some(row[e].clone()), Some(key)),
                None => {
                    dropped += 1;
                    continue;
                }
            },
            None => (None, None),
        };

        let slot = *lookup.entry((entity_key, dates[i])).or_insert_with(|| {
            groups.push(DailyGroup {
                entity,
                date: dates[i],
                members: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].members.push(i);
    }

    if dropped > 0 {
        log::debug!("dropped {} rows without an entity value", dropped);
    }

    let mut aggregations = Vec::with_capacity(schema.features().len());
    for feature in schema.features() {
        let agg = config.aggregation_for(&feature.name).ok_or_else(|| {
            TrendError::InvalidConfig(format!(
                "no daily aggregation chosen for feature '{}'",
                feature.name
            ))
        })?;
        aggregations.push((feature.index, agg));
    }

    let mut columns = Vec::with_capacity(schema.features().len() + 2);
    if let Some(name) = schema.entity_name() {
        columns.push(name.to_string());
    }
    columns.push(schema.date_name().to_string());
    columns.extend(schema.features().iter().map(|f| f.name.clone()));

    let rows = groups
        .into_iter()
        .map(|group| {
            let mut row = Vec::with_capacity(columns.len());
            if let Some(entity) = group.entity {
                row.push(entity);
            }
            row.push(Value::Date(group.date));
            for &(idx, agg) in &aggregations {
                let values: Vec<f64> = group
                    .members
                    .iter()
                    .map(|&m| dataset.rows()[m][idx].to_f64_or_nan())
                    .collect();
                row.push(Value::Number(aggregate(&values, agg)));
            }
            row
        })
        .collect();

    Dataset::new(columns, rows)
}
