//! Chart-ready trend bundles, one per (entity, feature).

use super::smooth::{long_trend_column, short_trend_column, TrendReport};
use crate::core::{GroupKey, Value};
use crate::error::{Result, TrendError};
use chrono::NaiveDateTime;
use std::collections::{HashMap, HashSet};

/// Legend label of the short-window trend line.
pub const IMMEDIATE_LABEL: &str = "Immediate effects";

/// Legend label of the long-window trend line.
pub const DELAYED_LABEL: &str = "Delayed cumulative effects";

/// Lookup key of a curve: the entity's grouping identity and the feature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CurveKey {
    pub entity: Option<GroupKey>,
    pub feature: String,
}

impl CurveKey {
    pub fn new(entity: Option<&Value>, feature: &str) -> Self {
        Self {
            entity: entity.and_then(Value::group_key),
            feature: feature.to_string(),
        }
    }
}

/// Series for one chart: raw values as bars, both trends as lines.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendCurve {
    pub title: String,
    pub entity: Option<String>,
    pub feature: String,
    /// Dates.
    pub x: Vec<NaiveDateTime>,
    /// Feature values.
    pub y: Vec<f64>,
    /// Immediate trend.
    pub y1: Vec<f64>,
    /// Delayed cumulative trend.
    pub y2: Vec<f64>,
}

impl TrendCurve {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// All curves of a report, in display order (entity-major, then feature).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendCurves {
    curves: Vec<TrendCurve>,
    index: HashMap<CurveKey, usize>,
    entities: Vec<String>,
}

impl TrendCurves {
    /// Curve of `feature` for the entity displayed as `entity`.
    ///
    /// Entities are matched by their display text; if two distinct entity
    /// values print the same, the first one wins. Use [`Self::get_by_value`]
    /// to tell them apart.
    pub fn get(&self, entity: Option<&str>, feature: &str) -> Option<&TrendCurve> {
        self.curves
            .iter()
            .find(|c| c.entity.as_deref() == entity && c.feature == feature)
    }

    /// Curve of `feature` for the entity cell `entity`.
    pub fn get_by_value(&self, entity: Option<&Value>, feature: &str) -> Option<&TrendCurve> {
        self.index
            .get(&CurveKey::new(entity, feature))
            .map(|&i| &self.curves[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrendCurve> {
        self.curves.iter()
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Entities in order of first appearance; empty without an entity column.
    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    fn push(&mut self, entity: Option<GroupKey>, curve: TrendCurve) {
        let key = CurveKey {
            entity,
            feature: curve.feature.clone(),
        };
        self.index.insert(key, self.curves.len());
        self.curves.push(curve);
    }
}

/// Rows of one entity in report order.
struct EntityRows {
    key: Option<GroupKey>,
    name: Option<String>,
    members: Vec<usize>,
}

/// Build one curve per feature, or per (entity, feature) for grouped reports.
pub fn build_curves(report: &TrendReport) -> Result<TrendCurves> {
    let table = report.table();
    let mut curves = TrendCurves::default();
    if report.is_empty() {
        return Ok(curves);
    }

    let date_idx = column(report, report.date_column())?;
    let mut feature_cols = Vec::with_capacity(report.features().len());
    for f in report.features() {
        feature_cols.push((
            f.as_str(),
            column(report, f)?,
            column(report, &short_trend_column(f))?,
            column(report, &long_trend_column(f))?,
        ));
    }

    // (entity key, display name, member rows) per entity, or a single unnamed group
    let groups: Vec<EntityRows> = match report.entity_column() {
        Some(entity) => {
            let entity_idx = column(report, entity)?;
            let mut groups: Vec<EntityRows> = Vec::new();
            let mut lookup: HashMap<GroupKey, usize> = HashMap::new();
            for (i, row) in table.rows().iter().enumerate() {
                if let Some(key) = row[entity_idx].group_key() {
                    let slot = *lookup.entry(key.clone()).or_insert_with(|| {
                        groups.push(EntityRows {
                            key: Some(key),
                            name: Some(row[entity_idx].to_string()),
                            members: Vec::new(),
                        });
                        groups.len() - 1
                    });
                    groups[slot].members.push(i);
                }
            }
            groups
        }
        None => vec![EntityRows {
            key: None,
            name: None,
            members: (0..table.len()).collect(),
        }],
    };

    let mut names = HashSet::new();
    for group in &groups {
        if let Some(name) = &group.name {
            if !names.insert(name.as_str()) {
                log::warn!(
                    "several entity values display as '{}'; look their curves up by value",
                    name
                );
            }
        }
    }

    for group in groups {
        let entity = group.name;
        let members = group.members;
        if let Some(name) = &entity {
            curves.entities.push(name.clone());
        }
        for &(feature, value_idx, tc_idx, tl_idx) in &feature_cols {
            let pick = |idx: usize| -> Vec<f64> {
                members
                    .iter()
                    .map(|&r| table.rows()[r][idx].to_f64_or_nan())
                    .collect()
            };
            let x = members
                .iter()
                .map(|&r| {
                    table.rows()[r][date_idx].as_date().ok_or_else(|| {
                        TrendError::InvalidParameter(format!(
                            "report row {} has no parsed date",
                            r
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            let title = match &entity {
                Some(name) => format!("{} - {}", name, feature),
                None => feature.to_string(),
            };

            curves.push(
                group.key.clone(),
                TrendCurve {
                    title,
                    entity: entity.clone(),
                    feature: feature.to_string(),
                    x,
                    y: pick(value_idx),
                    y1: pick(tc_idx),
                    y2: pick(tl_idx),
                },
            );
        }
    }

    Ok(curves)
}

fn column(report: &TrendReport, name: &str) -> Result<usize> {
    report
        .table()
        .column_index(name)
        .ok_or_else(|| TrendError::MissingColumn(name.to_string()))
}
