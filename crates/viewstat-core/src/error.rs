//! Error types for viewstat
//!
//! This module defines the error types used throughout the viewstat library.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! # Example
//!
//! ```
//! use viewstat_core::error::{ViewstatError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to ViewstatError
//!     let _file = std::fs::read_to_string("nonexistent.jsonl")?;
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::types::VideoId;

/// Main error type for viewstat operations
///
/// Data anomalies (decreasing counters, gaps, empty feeds) are not errors;
/// the aggregator absorbs them. These variants cover programming mistakes,
/// unparseable input, and IO.
#[derive(Error, Debug)]
pub enum ViewstatError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// No observation file found at the resolved location
    #[error("No observation data found at {}", .0.display())]
    NoDataFile(PathBuf),

    /// No observations recorded for the requested video
    #[error("No observations for video: {0}")]
    NoObservations(VideoId),

    /// Invalid aggregator configuration, such as a non-positive interval width
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Timestamp string could not be parsed
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Invalid timezone
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Parse error with file context
    #[error("Parse error in {file}: {error}")]
    Parse {
        /// The file that caused the error
        file: PathBuf,
        /// The error message
        error: String,
    },

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience type alias for Results in viewstat
///
/// # Example
///
/// ```
/// use viewstat_core::Result;
///
/// fn process_data() -> Result<String> {
///     Ok("Processed successfully".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, ViewstatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ViewstatError::InvalidConfiguration("interval width must be positive".into());
        assert_eq!(
            error.to_string(),
            "Invalid configuration: interval width must be positive"
        );

        let error = ViewstatError::NoObservations(VideoId::new("abc123"));
        assert_eq!(error.to_string(), "No observations for video: abc123");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let viewstat_error: ViewstatError = io_error.into();
        assert!(matches!(viewstat_error, ViewstatError::Io(_)));
    }

    #[test]
    fn test_no_data_file_display() {
        let error = ViewstatError::NoDataFile(PathBuf::from("/tmp/observations.jsonl"));
        assert_eq!(
            error.to_string(),
            "No observation data found at /tmp/observations.jsonl"
        );
    }
}
