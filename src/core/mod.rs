//! Core data structures: cell values, datasets and resolved schemas.

mod dataset;
mod schema;
mod value;

pub use dataset::{Dataset, DatasetBuilder};
pub use schema::{FeatureColumn, Schema};
pub use value::{parse_datetime, GroupKey, Value};
