//! Core types, traits, and utilities for viewstat
//!
//! This crate provides the foundational types, error handling,
//! timezone configuration, and interval grid arithmetic used
//! by all other viewstat crates.

pub mod aggregation_types;
pub mod error;
pub mod interval;
pub mod timezone;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{Result, ViewstatError};
pub use interval::{DEFAULT_INTERVAL_HOURS, IntervalWidth};
pub use types::{Observation, RawObservation, VideoId, VideoObservation};
