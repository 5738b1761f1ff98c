//! Interval aggregation of cumulative view counts
//!
//! Analytics feeds report a running total of views at whatever cadence the
//! poller happens to run. Charts need the opposite: how many *new* views
//! arrived in each fixed slot. This module resamples the running total onto
//! a regular grid with a step-function rule (the value at an instant is the
//! last sample taken at or before it) and differences neighbouring grid
//! points.
//!
//! The result always ends with one partial bucket covering the interval that
//! is still in progress, so a renderer can tell "growth slowed down" apart
//! from "the interval is not over yet".
//!
//! # Examples
//!
//! ```
//! use viewstat::aggregation::aggregate_intervals;
//! use viewstat::types::Observation;
//! use chrono::{Duration, TimeZone, Utc};
//!
//! let t0 = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
//! let observations = vec![
//!     Observation::new(t0, 0),
//!     Observation::new(t0 + Duration::hours(3), 50),
//!     Observation::new(t0 + Duration::hours(7), 120),
//! ];
//!
//! let buckets = aggregate_intervals(&observations, 6, t0 + Duration::hours(7))?;
//! assert_eq!(buckets[0].delta_views, 50);
//!
//! let partial = buckets.last().unwrap();
//! assert!(partial.is_partial);
//! assert_eq!(partial.delta_views, 70);
//! # Ok::<(), viewstat::ViewstatError>(())
//! ```

use crate::aggregation_types::IntervalBucket;
use crate::error::Result;
use crate::interval::{IntervalWidth, format_interval_label, resolve_local};
use crate::timezone::TimezoneConfig;
use crate::types::{Observation, VideoId, VideoObservation};
use chrono::{DateTime, Utc};
use futures::stream::{Stream, StreamExt};
use std::collections::BTreeMap;
use tracing::debug;

/// Step-function view lookup over observations sorted by timestamp
pub(crate) struct ViewTimeline<'a> {
    sorted: &'a [Observation],
}

impl<'a> ViewTimeline<'a> {
    /// Wrap an already-sorted slice
    pub(crate) fn new(sorted: &'a [Observation]) -> Self {
        Self { sorted }
    }

    /// Cumulative views of the last observation at or before `at`
    pub(crate) fn views_at(&self, at: DateTime<Utc>) -> Option<u64> {
        let idx = self.sorted.partition_point(|o| o.timestamp <= at);
        idx.checked_sub(1).map(|i| self.sorted[i].cumulative_views)
    }

    /// Counter value before anything was observed
    ///
    /// The earliest sample stands in for the unknown prior history, so the
    /// first interval never reports the video's whole lifetime as new views.
    pub(crate) fn baseline(&self) -> u64 {
        self.sorted.first().map_or(0, |o| o.cumulative_views)
    }

    /// `views_at(end) - views_at(start)` with gaps carried forward, clamped at zero
    pub(crate) fn delta(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
        let start_views = self.views_at(start).unwrap_or_else(|| self.baseline());
        let end_views = self.views_at(end).unwrap_or(start_views);
        end_views.saturating_sub(start_views)
    }
}

/// Sort observations by timestamp, keeping arrival order for equal timestamps
pub fn sort_observations(observations: &[Observation]) -> Vec<Observation> {
    let mut sorted = observations.to_vec();
    sorted.sort_by_key(|o| o.timestamp);
    sorted
}

/// Stateless interval aggregator
///
/// Holds only configuration; every call to [`IntervalAggregator::aggregate`]
/// recomputes the series from scratch.
#[derive(Debug, Clone)]
pub struct IntervalAggregator {
    width: IntervalWidth,
    timezone_config: TimezoneConfig,
}

impl IntervalAggregator {
    /// Create a new aggregator
    pub fn new(width: IntervalWidth, timezone_config: TimezoneConfig) -> Self {
        Self {
            width,
            timezone_config,
        }
    }

    /// Get the interval width
    pub fn width(&self) -> IntervalWidth {
        self.width
    }

    /// Get the timezone configuration
    pub fn timezone_config(&self) -> &TimezoneConfig {
        &self.timezone_config
    }

    /// Build the delta series for one video
    ///
    /// Walks the local grid from the slot holding the earliest sample up to
    /// and including the slot holding `reference_now`, then appends the
    /// partial bucket `[current boundary, reference_now]`. Returns an empty
    /// list when there are no observations.
    pub fn aggregate(
        &self,
        observations: &[Observation],
        reference_now: DateTime<Utc>,
    ) -> Vec<IntervalBucket> {
        if observations.is_empty() {
            return Vec::new();
        }

        let sorted = sort_observations(observations);
        let timeline = ViewTimeline::new(&sorted);
        let tz = &self.timezone_config.tz;

        let current_slot = self.width.floor_local(reference_now, tz);
        let current_boundary = resolve_local(current_slot, tz);

        let mut buckets = Vec::new();
        let mut slot = self.width.floor_local(sorted[0].timestamp, tz);
        while slot <= current_slot {
            let next = self.width.next_local(slot);
            let start = resolve_local(slot, tz);
            let end = resolve_local(next, tz);
            // Slots swallowed by a forward DST jump have no length
            if end > start {
                buckets.push(IntervalBucket {
                    label: format_interval_label(start, tz),
                    start_time: start,
                    end_time: end,
                    delta_views: timeline.delta(start, end),
                    is_partial: false,
                });
            }
            slot = next;
        }

        buckets.push(IntervalBucket {
            label: format_interval_label(current_boundary, tz),
            start_time: current_boundary,
            end_time: reference_now,
            delta_views: timeline.delta(current_boundary, reference_now),
            is_partial: true,
        });

        debug!(
            "Aggregated {} observations into {} buckets of {}",
            sorted.len(),
            buckets.len(),
            self.width
        );
        buckets
    }
}

/// Aggregate observations onto a UTC-aligned grid
///
/// Convenience wrapper around [`IntervalAggregator`] taking the width as a
/// raw hour count.
///
/// # Errors
///
/// Returns `ViewstatError::InvalidConfiguration` if `interval_width_hours` is not
/// in `1..=24`.
pub fn aggregate_intervals(
    observations: &[Observation],
    interval_width_hours: i64,
    reference_now: DateTime<Utc>,
) -> Result<Vec<IntervalBucket>> {
    let width = IntervalWidth::from_hours(interval_width_hours)?;
    Ok(IntervalAggregator::new(width, TimezoneConfig::utc()).aggregate(observations, reference_now))
}

/// Collect a stream of tagged observations into per-video lists
///
/// The first error in the stream aborts collection.
pub async fn group_by_video(
    entries: impl Stream<Item = Result<VideoObservation>>,
) -> Result<BTreeMap<VideoId, Vec<Observation>>> {
    let mut by_video: BTreeMap<VideoId, Vec<Observation>> = BTreeMap::new();

    tokio::pin!(entries);
    while let Some(result) = entries.next().await {
        let entry = result?;
        by_video
            .entry(entry.video_id)
            .or_default()
            .push(entry.observation);
    }

    debug!("Grouped observations for {} videos", by_video.len());
    Ok(by_video)
}
