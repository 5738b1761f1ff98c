//! Terminal output formatting for viewstat
//!
//! This crate provides table and JSON output formatters for interval
//! series, video summaries, and video listings.

pub mod output;

pub use output::{JsonFormatter, OutputFormatter, TableFormatter, get_formatter};
