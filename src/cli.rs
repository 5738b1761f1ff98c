//! CLI interface for viewstat
//!
//! This module defines the command-line interface using clap. Global flags
//! control the data file, the interval grid, and the timezone; subcommands
//! select the report.
//!
//! # Example
//!
//! ```bash
//! # Six-hour view deltas for one video
//! viewstat intervals --video abc123
//!
//! # Twelve-hour grid in Tokyo time, with room for a day of future slots
//! viewstat --interval-hours 12 --timezone Asia/Tokyo intervals --future-slots 2
//!
//! # Views gained in the last week, per video
//! viewstat summary --period week --json
//! ```

use crate::aggregation_types::Period;
use crate::error::{Result, ViewstatError};
use crate::interval::DEFAULT_INTERVAL_HOURS;
use crate::types::{Observation, VideoId};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Turn cumulative video view counts into interval deltas
#[derive(Parser, Debug, Clone)]
#[command(name = "viewstat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Observation file (JSONL, or a JSON array when the extension is .json)
    /// Defaults to $VIEWSTAT_DATA_PATH, then the platform data directory
    #[arg(long, short = 'f', global = true)]
    pub file: Option<PathBuf>,

    /// Interval width in hours
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_INTERVAL_HOURS,
        env = "VIEWSTAT_INTERVAL_HOURS",
        allow_negative_numbers = true
    )]
    pub interval_hours: i64,

    /// Reference "now" as an RFC 3339 timestamp (defaults to the current time)
    #[arg(long, global = true)]
    pub now: Option<String>,

    /// Only use observations on or after this date (YYYY-MM-DD or YYYY-MM)
    #[arg(long, global = true)]
    pub since: Option<String>,

    /// Only use observations on or before this date (YYYY-MM-DD or YYYY-MM)
    #[arg(long, global = true)]
    pub until: Option<String>,

    /// Timezone for interval alignment and labels (e.g. "Europe/Madrid", "UTC")
    /// If not specified, uses the system's local timezone
    #[arg(long, short = 'z', global = true)]
    pub timezone: Option<String>,

    /// Use UTC for interval alignment (overrides --timezone)
    #[arg(long, global = true)]
    pub utc: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available reports
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show new views per interval, including the in-progress interval
    Intervals {
        /// Video to report on (may be omitted when the file holds a single video)
        #[arg(long)]
        video: Option<String>,

        /// Number of empty future slots to append to the chart series
        #[arg(long, default_value_t = 0)]
        future_slots: usize,
    },

    /// Show totals per video, optionally with the views gained in a trailing window
    Summary {
        /// Trailing window: week or month
        #[arg(long)]
        period: Option<Period>,
    },

    /// List recorded videos with their observation counts
    Videos,
}

/// Parse date filter in YYYY-MM-DD or YYYY-MM format
///
/// # Examples
///
/// ```
/// use viewstat::cli::parse_date_filter;
/// use chrono::Datelike;
///
/// let date = parse_date_filter("2024-03-05").unwrap();
/// assert_eq!(date.day(), 5);
///
/// let date = parse_date_filter("2024-03").unwrap();
/// assert_eq!(date.day(), 1);
/// ```
pub fn parse_date_filter(date_str: &str) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
        return Ok(date);
    }

    // YYYY-MM maps to the first day of the month
    match date_str.split_once('-') {
        Some((year, month)) => {
            let year = year
                .parse::<i32>()
                .map_err(|_| ViewstatError::InvalidDate(format!("Invalid year in '{date_str}'")))?;
            let month = month
                .parse::<u32>()
                .map_err(|_| ViewstatError::InvalidDate(format!("Invalid month in '{date_str}'")))?;

            if !(1..=12).contains(&month) {
                return Err(ViewstatError::InvalidDate(format!(
                    "Month must be between 1-12, got {month}"
                )));
            }

            NaiveDate::from_ymd_opt(year, month, 1)
                .ok_or_else(|| ViewstatError::InvalidDate(format!("Invalid date: {date_str}")))
        }
        None => Err(ViewstatError::InvalidDate(format!(
            "Invalid date format '{date_str}', expected YYYY-MM-DD or YYYY-MM"
        ))),
    }
}

/// Resolve the reference "now", falling back to the wall clock
pub fn parse_reference_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    match now {
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| ViewstatError::InvalidTimestamp(format!("{value}: {e}"))),
        None => Ok(Utc::now()),
    }
}

/// Tracing filter directive for the run
///
/// `--verbose` wins over `RUST_LOG`; without either, only warnings are shown.
pub fn log_filter_directive(verbose: bool, rust_log: Option<&str>) -> String {
    match (verbose, rust_log) {
        (true, _) => "viewstat=info".to_string(),
        (false, Some(directive)) if !directive.trim().is_empty() => directive.to_string(),
        (false, _) => "viewstat=warn".to_string(),
    }
}

/// Pick the observations of one video
///
/// Without an explicit video the file must hold exactly one.
pub fn select_video(
    mut by_video: BTreeMap<VideoId, Vec<Observation>>,
    requested: Option<&str>,
) -> Result<(VideoId, Vec<Observation>)> {
    if let Some(name) = requested {
        let video_id = VideoId::new(name);
        return by_video
            .remove_entry(&video_id)
            .ok_or(ViewstatError::NoObservations(video_id));
    }

    match by_video.len() {
        0 => Err(ViewstatError::NoObservations(VideoId::default())),
        1 => by_video
            .pop_first()
            .ok_or(ViewstatError::NoObservations(VideoId::default())),
        _ => {
            let ids: Vec<&str> = by_video.keys().map(VideoId::as_str).collect();
            Err(ViewstatError::InvalidArgument(format!(
                "Multiple videos recorded ({}), pass --video",
                ids.join(", ")
            )))
        }
    }
}
