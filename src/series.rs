//! Chart series and per-video summaries
//!
//! Turns aggregated buckets into the records a line-chart renderer consumes,
//! and computes the headline figures shown next to each chart.

use crate::aggregation::{ViewTimeline, sort_observations};
use crate::aggregation_types::{ChartPoint, ChartSeries, IntervalBucket, Period, VideoSummary};
use crate::interval::{IntervalWidth, format_interval_label, resolve_local};
use crate::types::{Observation, VideoId};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Convert buckets into chart points
///
/// Completed buckets are labelled by their start. The partial point is
/// labelled by its end (the reference "now") so it gets its own x-axis slot
/// right after the interval it belongs to. The grid slot holding "now" is
/// flagged `is_open` so totals leave it to the partial point.
/// `future_slots` zero-valued placeholders follow the partial point, one per
/// upcoming grid slot, so the axis shows room for upcoming data.
pub fn build_chart_series(
    buckets: &[IntervalBucket],
    width: IntervalWidth,
    tz: &Tz,
    future_slots: usize,
) -> ChartSeries {
    let partial = buckets.iter().rev().find(|b| b.is_partial);
    let reference_now = partial.map(|p| p.end_time);

    let mut points: Vec<ChartPoint> = buckets
        .iter()
        .map(|bucket| ChartPoint {
            interval: if bucket.is_partial {
                format_interval_label(bucket.end_time, tz)
            } else {
                bucket.label.clone()
            },
            views: bucket.delta_views,
            is_partial: bucket.is_partial,
            is_open: !bucket.is_partial
                && reference_now.is_some_and(|now| !bucket.is_complete(now)),
            is_placeholder: false,
        })
        .collect();

    if let Some(partial) = partial {
        let mut slot = width.floor_local(partial.start_time, tz);
        let mut previous = partial.start_time;
        let mut added = 0;
        while added < future_slots {
            slot = width.next_local(slot);
            let start = resolve_local(slot, tz);
            // Two local boundaries can collapse onto one instant at a DST jump
            if start <= previous {
                continue;
            }
            previous = start;
            points.push(ChartPoint {
                interval: format_interval_label(start, tz),
                views: 0,
                is_partial: false,
                is_open: false,
                is_placeholder: true,
            });
            added += 1;
        }
    }

    ChartSeries { points }
}

/// Headline numbers for one video as of `reference_now`
///
/// Samples recorded after `reference_now` are ignored, so every figure
/// describes the same snapshot. Returns `None` when no sample precedes
/// `reference_now`. With a `period`, the window gain is the latest value
/// minus the value at the window start (the earliest sample stands in when
/// the window predates the feed), clamped at zero.
pub fn summarize_video(
    video_id: &VideoId,
    observations: &[Observation],
    reference_now: DateTime<Utc>,
    period: Option<Period>,
) -> Option<VideoSummary> {
    let sorted = sort_observations(observations);
    let visible = &sorted[..sorted.partition_point(|o| o.timestamp <= reference_now)];
    let first = visible.first()?;
    let last = visible.last()?;
    let timeline = ViewTimeline::new(visible);

    let views_in_period =
        period.map(|p| timeline.delta(reference_now - p.duration(), reference_now));

    Some(VideoSummary {
        video_id: video_id.clone(),
        total_views: last.cumulative_views,
        first_seen: first.timestamp,
        last_seen: last.timestamp,
        observation_count: visible.len(),
        views_in_period,
    })
}
