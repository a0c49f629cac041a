//! Column roles resolved against a concrete dataset.

use super::dataset::Dataset;
use super::value::Value;
use crate::config::TrendConfig;
use crate::error::{Result, TrendError};

/// A resolved feature column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureColumn {
    pub name: String,
    pub index: usize,
}

/// Column positions for the date, entity and feature roles.
///
/// Missing columns and non-numeric feature cells are reported here, before
/// any computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    date_name: String,
    date: usize,
    entity: Option<(String, usize)>,
    features: Vec<FeatureColumn>,
}

impl Schema {
    pub fn resolve(config: &TrendConfig, dataset: &Dataset) -> Result<Self> {
        let lookup = |name: &str| {
            dataset
                .column_index(name)
                .ok_or_else(|| TrendError::MissingColumn(name.to_string()))
        };

        let date = lookup(&config.date_column)?;
        let entity = match &config.entity_column {
            Some(name) => Some((name.clone(), lookup(name)?)),
            None => None,
        };

        let mut features = Vec::with_capacity(config.feature_columns.len());
        for name in &config.feature_columns {
            let index = lookup(name)?;
            for (row, cells) in dataset.rows().iter().enumerate() {
                match &cells[index] {
                    Value::Null | Value::Number(_) => {}
                    other => {
                        return Err(TrendError::NonNumeric {
                            column: name.clone(),
                            row,
                            value: other.to_string(),
                        })
                    }
                }
            }
            features.push(FeatureColumn {
                name: name.clone(),
                index,
            });
        }

        Ok(Self {
            date_name: config.date_column.clone(),
            date,
            entity,
            features,
        })
    }

    pub fn date_index(&self) -> usize {
        self.date
    }

    pub fn date_name(&self) -> &str {
        &self.date_name
    }

    pub fn entity_index(&self) -> Option<usize> {
        self.entity.as_ref().map(|(_, idx)| *idx)
    }

    pub fn entity_name(&self) -> Option<&str> {
        self.entity.as_ref().map(|(name, _)| name.as_str())
    }

    pub fn features(&self) -> &[FeatureColumn] {
        &self.features
    }
}
