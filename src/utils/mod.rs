//! Utility functions shared across the engine.

pub mod stats;

pub use stats::{mean, median, successive_difference_variance, variance};
