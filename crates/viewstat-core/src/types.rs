//! Core domain types for viewstat
//!
//! This module contains the fundamental types used throughout the viewstat library:
//! video identifiers, cumulative view-count observations, and the raw wire
//! records they are parsed from.

use crate::error::{Result, ViewstatError};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Video identifier used when a record does not name its video
pub const DEFAULT_VIDEO_ID: &str = "default";

/// Strongly-typed video identifier wrapper
///
/// # Examples
/// ```
/// use viewstat_core::types::VideoId;
///
/// let video = VideoId::new("dQw4w9WgXcQ");
/// assert_eq!(video.as_str(), "dQw4w9WgXcQ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VideoId(String);

impl VideoId {
    /// Create a new VideoId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Default for VideoId {
    fn default() -> Self {
        Self::new(DEFAULT_VIDEO_ID)
    }
}

/// Snapshot of the total views of one video at one instant
///
/// `cumulative_views` is non-decreasing in a healthy feed, but consumers
/// must tolerate the odd reset or out-of-order sample.
///
/// # Examples
/// ```
/// use viewstat_core::types::Observation;
/// use chrono::{TimeZone, Utc};
///
/// let obs = Observation::new(Utc.with_ymd_and_hms(2024, 3, 5, 6, 0, 0).unwrap(), 1_250);
/// assert_eq!(obs.cumulative_views, 1_250);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// When the counter was sampled
    pub timestamp: DateTime<Utc>,
    /// Total views to date at `timestamp`
    pub cumulative_views: u64,
}

impl Observation {
    /// Create a new Observation
    pub fn new(timestamp: DateTime<Utc>, cumulative_views: u64) -> Self {
        Self {
            timestamp,
            cumulative_views,
        }
    }
}

/// An observation tagged with the video it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoObservation {
    /// Video the sample was taken for
    pub video_id: VideoId,
    /// The sample itself
    pub observation: Observation,
}

/// Observation record as delivered by the analytics collaborator
///
/// Timestamps arrive as strings and the view count may be missing; a
/// missing count is read as zero. Both `videoId` and `video_id` spellings
/// are accepted.
///
/// # Examples
/// ```
/// use viewstat_core::types::RawObservation;
///
/// let raw: RawObservation =
///     serde_json::from_str(r#"{"videoId":"abc","timestamp":"2024-03-05T06:00:00Z","views":42}"#)
///         .unwrap();
/// let tagged = raw.into_video_observation().unwrap();
/// assert_eq!(tagged.video_id.as_str(), "abc");
/// assert_eq!(tagged.observation.cumulative_views, 42);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawObservation {
    /// Video the record belongs to
    #[serde(default, alias = "video_id", skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    /// ISO-8601 timestamp string
    pub timestamp: String,
    /// Cumulative view count, if reported
    #[serde(default)]
    pub views: Option<u64>,
}

impl RawObservation {
    /// Parse the timestamp and build an untagged observation
    ///
    /// # Errors
    ///
    /// Returns `ViewstatError::InvalidTimestamp` if the timestamp cannot be parsed.
    pub fn to_observation(&self) -> Result<Observation> {
        let timestamp = parse_timestamp(&self.timestamp)?;
        Ok(Observation::new(timestamp, self.views.unwrap_or(0)))
    }

    /// Parse the record into an observation tagged with its video
    pub fn into_video_observation(self) -> Result<VideoObservation> {
        let observation = self.to_observation()?;
        let video_id = self.video_id.map(VideoId::new).unwrap_or_default();
        Ok(VideoObservation {
            video_id,
            observation,
        })
    }
}

impl TryFrom<RawObservation> for Observation {
    type Error = ViewstatError;

    fn try_from(raw: RawObservation) -> Result<Self> {
        raw.to_observation()
    }
}

/// Parse an ISO-8601 timestamp into UTC
///
/// RFC 3339 strings carry their own offset. Strings without an offset
/// (`2024-03-05T06:00:00` or `2024-03-05 06:00:00`, optionally with
/// fractional seconds) are read as UTC.
///
/// # Examples
/// ```
/// use viewstat_core::types::parse_timestamp;
///
/// let a = parse_timestamp("2024-03-05T08:00:00+02:00").unwrap();
/// let b = parse_timestamp("2024-03-05 06:00:00").unwrap();
/// assert_eq!(a, b);
/// assert!(parse_timestamp("yesterday").is_err());
/// ```
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }

    Err(ViewstatError::InvalidTimestamp(format!(
        "'{value}'. Expected ISO-8601, e.g. 2024-03-05T06:00:00Z"
    )))
}
