//! Aggregation data types for viewstat
//!
//! Pure data structures produced by the interval aggregator and consumed by
//! formatters and chart renderers. These types hold no references to the
//! loader or the aggregator.

use crate::types::VideoId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One fixed-width slot of the view-delta grid
///
/// `delta_views` is the counter value resolved at `end_time` minus the value
/// resolved at `start_time`, never negative. The trailing bucket of a series
/// has `is_partial` set and ends at the reference "now" instead of a full
/// interval later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalBucket {
    /// Human-readable interval start, e.g. `5/3 06:00`
    pub label: String,
    /// Interval start (a grid boundary)
    pub start_time: DateTime<Utc>,
    /// Interval end (start plus width, or "now" for the partial bucket)
    pub end_time: DateTime<Utc>,
    /// New views inside the interval
    pub delta_views: u64,
    /// Whether this is the in-progress interval
    pub is_partial: bool,
}

impl IntervalBucket {
    /// Wall-clock time covered by the bucket
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// Whether the slot had fully elapsed by `reference_now`
    ///
    /// The grid slot holding "now" is not complete even though it is not the
    /// partial bucket; its views are still counted by the partial.
    pub fn is_complete(&self, reference_now: DateTime<Utc>) -> bool {
        !self.is_partial && self.end_time <= reference_now
    }
}

/// A single record handed to the chart renderer
///
/// Serialized in the renderer's camelCase shape:
/// `{"interval":"5/3 06:00","views":50,"isPartial":false}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    /// X-axis label
    pub interval: String,
    /// New views in the interval
    pub views: u64,
    /// In-progress interval, drawn with distinct styling
    pub is_partial: bool,
    /// Grid slot that has not ended yet; shares its views with the partial point
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_open: bool,
    /// Empty future slot that only widens the x-axis
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_placeholder: bool,
}

/// Chart-ready series for one video
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Points in x-axis order
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    /// The in-progress point, if the series has one
    pub fn partial_point(&self) -> Option<&ChartPoint> {
        self.points.iter().find(|p| p.is_partial)
    }

    /// Grid point just before the partial point, followed by the partial point
    ///
    /// This pair is what the renderer draws as the highlighted "now" segment.
    pub fn highlight_segment(&self) -> Option<(&ChartPoint, &ChartPoint)> {
        let partial_index = self.points.iter().position(|p| p.is_partial)?;
        let previous = self.points[..partial_index]
            .iter()
            .rev()
            .find(|p| !p.is_placeholder)?;
        Some((previous, &self.points[partial_index]))
    }

    /// Label shown on the highlighted segment, e.g. `+70 so far`
    pub fn now_label(&self) -> Option<String> {
        self.partial_point().map(|p| format!("+{} so far", p.views))
    }

    /// Sum of views over completed grid points only
    pub fn completed_views(&self) -> u64 {
        self.points
            .iter()
            .filter(|p| !p.is_partial && !p.is_open && !p.is_placeholder)
            .map(|p| p.views)
            .sum()
    }

    /// Whether the series has no data points
    pub fn is_empty(&self) -> bool {
        self.points.iter().all(|p| p.is_placeholder)
    }
}

/// Trailing window used for "views in the last week/month" figures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Trailing 7 days
    Week,
    /// Trailing 30 days
    Month,
}

impl Period {
    /// Number of days the window spans
    pub fn days(&self) -> i64 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
        }
    }

    /// Window length as a duration
    pub fn duration(&self) -> Duration {
        Duration::days(self.days())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Week => write!(f, "week"),
            Self::Month => write!(f, "month"),
        }
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "week" | "w" | "7d" => Ok(Self::Week),
            "month" | "m" | "30d" => Ok(Self::Month),
            _ => Err(format!("Invalid period: {s} (expected 'week' or 'month')")),
        }
    }
}

/// Headline numbers for one video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSummary {
    /// Video the summary describes
    pub video_id: VideoId,
    /// Latest cumulative view count
    pub total_views: u64,
    /// Earliest observation timestamp
    pub first_seen: DateTime<Utc>,
    /// Latest observation timestamp
    pub last_seen: DateTime<Utc>,
    /// Number of samples recorded
    pub observation_count: usize,
    /// Views gained inside the requested trailing window
    #[serde(skip_serializing_if = "Option::is_none")]
    pub views_in_period: Option<u64>,
}
