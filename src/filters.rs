//! Filtering module for observations
//!
//! Narrows a stream of observations down to one video and/or a date range
//! before aggregation.
//!
//! # Examples
//!
//! ```
//! use viewstat::filters::ObservationFilter;
//! use viewstat::types::VideoId;
//! use chrono::NaiveDate;
//!
//! let filter = ObservationFilter::new()
//!     .with_video(VideoId::new("dQw4w9WgXcQ"))
//!     .with_since(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
//!     .with_until(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
//! ```

use crate::types::{VideoId, VideoObservation};
use chrono::NaiveDate;
use chrono_tz::Tz;

/// Filter configuration for observations
///
/// All filters are optional and combine with AND. Dates are inclusive and
/// evaluated in the configured timezone (UTC by default).
#[derive(Debug, Clone)]
pub struct ObservationFilter {
    /// Video filter
    pub video: Option<VideoId>,
    /// Start date filter (inclusive)
    pub since_date: Option<NaiveDate>,
    /// End date filter (inclusive)
    pub until_date: Option<NaiveDate>,
    /// Timezone used to turn timestamps into dates
    pub timezone: Tz,
}

impl Default for ObservationFilter {
    fn default() -> Self {
        Self {
            video: None,
            since_date: None,
            until_date: None,
            timezone: Tz::UTC,
        }
    }
}

impl ObservationFilter {
    /// Create a new filter with no restrictions
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only observations of `video`
    pub fn with_video(mut self, video: VideoId) -> Self {
        self.video = Some(video);
        self
    }

    /// Set the start date filter
    pub fn with_since(mut self, date: NaiveDate) -> Self {
        self.since_date = Some(date);
        self
    }

    /// Set the end date filter
    pub fn with_until(mut self, date: NaiveDate) -> Self {
        self.until_date = Some(date);
        self
    }

    /// Set the timezone used for date comparisons
    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.timezone = tz;
        self
    }

    /// Check if an observation passes the filter
    pub fn matches(&self, entry: &VideoObservation) -> bool {
        if let Some(video) = &self.video {
            if &entry.video_id != video {
                return false;
            }
        }

        let date = entry
            .observation
            .timestamp
            .with_timezone(&self.timezone)
            .date_naive();

        if let Some(since) = &self.since_date {
            if &date < since {
                return false;
            }
        }

        if let Some(until) = &self.until_date {
            if &date > until {
                return false;
            }
        }

        true
    }

    /// Filter a stream of observations
    ///
    /// Errors pass through untouched so the consumer still sees them.
    pub fn filter_stream<S>(
        self,
        stream: S,
    ) -> impl futures::Stream<Item = crate::error::Result<VideoObservation>>
    where
        S: futures::Stream<Item = crate::error::Result<VideoObservation>>,
    {
        use futures::StreamExt;

        stream.filter(move |result| {
            let keep = match result {
                Ok(entry) => self.matches(entry),
                Err(_) => true,
            };
            futures::future::ready(keep)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Observation;
    use chrono::{TimeZone, Utc};
    use futures::{StreamExt, stream};

    fn entry(video: &str, y: i32, m: u32, d: u32, h: u32) -> VideoObservation {
        VideoObservation {
            video_id: VideoId::new(video),
            observation: Observation::new(Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap(), 1),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = ObservationFilter::new();
        assert!(filter.matches(&entry("a", 2024, 3, 5, 0)));
    }

    #[test]
    fn test_video_filter() {
        let filter = ObservationFilter::new().with_video(VideoId::new("a"));
        assert!(filter.matches(&entry("a", 2024, 3, 5, 0)));
        assert!(!filter.matches(&entry("b", 2024, 3, 5, 0)));
    }

    #[test]
    fn test_date_range_inclusive() {
        let filter = ObservationFilter::new()
            .with_since(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
            .with_until(NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());

        assert!(!filter.matches(&entry("a", 2024, 3, 4, 23)));
        assert!(filter.matches(&entry("a", 2024, 3, 5, 0)));
        assert!(filter.matches(&entry("a", 2024, 3, 6, 23)));
        assert!(!filter.matches(&entry("a", 2024, 3, 7, 0)));
    }

    #[test]
    fn test_date_filter_respects_timezone() {
        // 23:00 UTC on the 4th is already the 5th in Tokyo
        let filter = ObservationFilter::new()
            .with_since(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap())
            .with_timezone(chrono_tz::Asia::Tokyo);
        assert!(filter.matches(&entry("a", 2024, 3, 4, 23)));
    }

    #[tokio::test]
    async fn test_filter_stream() {
        let entries = vec![
            Ok(entry("a", 2024, 3, 5, 0)),
            Ok(entry("b", 2024, 3, 5, 1)),
            Err(crate::error::ViewstatError::InvalidTimestamp("x".into())),
            Ok(entry("a", 2024, 3, 5, 2)),
        ];

        let filtered: Vec<_> = ObservationFilter::new()
            .with_video(VideoId::new("a"))
            .filter_stream(stream::iter(entries))
            .collect()
            .await;

        assert_eq!(filtered.len(), 3);
        assert!(filtered[1].is_err());
    }
}
