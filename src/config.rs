//! Report configuration: column roles, window lengths and daily aggregation.

use crate::error::{Result, TrendError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// How several rows sharing one date collapse into a single daily value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Arithmetic sum of the defined values.
    Sum,
    /// Median of the defined values.
    #[default]
    Median,
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregation::Sum => f.write_str("sum"),
            Aggregation::Median => f.write_str("median"),
        }
    }
}

impl FromStr for Aggregation {
    type Err = TrendError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(Aggregation::Sum),
            "median" => Ok(Aggregation::Median),
            other => Err(TrendError::InvalidConfig(format!(
                "unknown aggregation '{}' (expected 'sum' or 'median')",
                other
            ))),
        }
    }
}

/// Everything the engine needs to know about one report run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendConfig {
    /// Column holding the observation date.
    pub date_column: String,
    /// Numeric columns to smooth, in output order.
    pub feature_columns: Vec<String>,
    /// Optional entity identifier (e.g. athlete name); one trend per entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_column: Option<String>,
    /// Rows in the immediate (short) trend window.
    #[serde(default = "default_short_window")]
    pub short_window: usize,
    /// Rows in the delayed cumulative (long) trend window.
    #[serde(default = "default_long_window")]
    pub long_window: usize,
    /// Collapse rows that share a date before smoothing.
    #[serde(default)]
    pub group_by_date: bool,
    /// Per-feature daily aggregation, required for every feature when
    /// `group_by_date` is set.
    #[serde(default)]
    pub aggregations: BTreeMap<String, Aggregation>,
    /// Override for the rolling-median minimum observation count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_periods: Option<usize>,
}

fn default_short_window() -> usize {
    7
}

fn default_long_window() -> usize {
    28
}

impl TrendConfig {
    /// Configuration with default windows and no grouping.
    pub fn new<S: Into<String>>(
        date_column: impl Into<String>,
        feature_columns: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            date_column: date_column.into(),
            feature_columns: feature_columns.into_iter().map(Into::into).collect(),
            entity_column: None,
            short_window: default_short_window(),
            long_window: default_long_window(),
            group_by_date: false,
            aggregations: BTreeMap::new(),
            min_periods: None,
        }
    }

    /// Compute one trend per distinct value of this column.
    pub fn with_entity(mut self, column: impl Into<String>) -> Self {
        self.entity_column = Some(column.into());
        self
    }

    /// Set short and long window lengths.
    pub fn with_windows(mut self, short_window: usize, long_window: usize) -> Self {
        self.short_window = short_window;
        self.long_window = long_window;
        self
    }

    pub fn with_group_by_date(mut self, enabled: bool) -> Self {
        self.group_by_date = enabled;
        self
    }

    /// Set the daily aggregation for one feature.
    pub fn with_aggregation(mut self, feature: impl Into<String>, agg: Aggregation) -> Self {
        self.aggregations.insert(feature.into(), agg);
        self
    }

    pub fn with_min_periods(mut self, min_periods: usize) -> Self {
        self.min_periods = Some(min_periods);
        self
    }

    /// True when trends are computed per entity.
    pub fn is_grouped(&self) -> bool {
        self.entity_column.is_some()
    }

    /// Minimum observations before the rolling median is defined.
    ///
    /// Defaults to 2 per entity and 1 for a single series.
    pub fn min_periods(&self) -> usize {
        self.min_periods
            .unwrap_or(if self.is_grouped() { 2 } else { 1 })
    }

    /// Whether exponential smoothing uses bias-adjusted weights.
    ///
    /// Per-entity trends use the plain recursion; single series the adjusted form.
    pub fn adjust_ewm(&self) -> bool {
        !self.is_grouped()
    }

    pub fn aggregation_for(&self, feature: &str) -> Option<Aggregation> {
        self.aggregations.get(feature).copied()
    }

    /// Join keys for the export: `[entity, date]` or `[date]`.
    pub fn join_keys(&self) -> Vec<String> {
        match &self.entity_column {
            Some(entity) => vec![entity.clone(), self.date_column.clone()],
            None => vec![self.date_column.clone()],
        }
    }

    /// Check internal consistency. Does not look at any data.
    pub fn validate(&self) -> Result<()> {
        if self.date_column.is_empty() {
            return Err(TrendError::InvalidConfig(
                "date column must be set".to_string(),
            ));
        }
        if self.feature_columns.is_empty() {
            return Err(TrendError::InvalidConfig(
                "at least one feature column is required".to_string(),
            ));
        }
        if self.short_window < 1 {
            return Err(TrendError::InvalidConfig(
                "short_window must be >= 1".to_string(),
            ));
        }
        if self.long_window < 1 {
            return Err(TrendError::InvalidConfig(
                "long_window must be >= 1".to_string(),
            ));
        }
        if self.min_periods == Some(0) {
            return Err(TrendError::InvalidConfig(
                "min_periods must be >= 1".to_string(),
            ));
        }
        if self.entity_column.as_deref() == Some(self.date_column.as_str()) {
            return Err(TrendError::InvalidConfig(
                "entity column and date column must differ".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for feature in &self.feature_columns {
            if !seen.insert(feature.as_str()) {
                return Err(TrendError::InvalidConfig(format!(
                    "feature '{}' listed more than once",
                    feature
                )));
            }
            if *feature == self.date_column || self.entity_column.as_ref() == Some(feature) {
                return Err(TrendError::InvalidConfig(format!(
                    "feature '{}' is also a key column",
                    feature
                )));
            }
            if self.group_by_date && !self.aggregations.contains_key(feature) {
                return Err(TrendError::InvalidConfig(format!(
                    "no daily aggregation chosen for feature '{}'",
                    feature
                )));
            }
        }

        for feature in &self.feature_columns {
            for suffix in ["_tc", "_tl", "_agg"] {
                let derived = format!("{}{}", feature, suffix);
                if self.feature_columns.contains(&derived) {
                    return Err(TrendError::InvalidConfig(format!(
                        "feature '{}' clashes with the derived column of '{}'",
                        derived, feature
                    )));
                }
            }
        }

        Ok(())
    }

    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| TrendError::Config(format!("failed to parse config: {}", e)))
    }

    /// Load a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| TrendError::Config(format!("failed to serialize config: {}", e)))
    }
}
