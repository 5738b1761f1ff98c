//! Output formatting module for viewstat
//!
//! This module provides formatters for displaying view data in different formats:
//! - Table format for human-readable terminal output
//! - JSON format for chart renderers and other tools
//!
//! # Examples
//!
//! ```
//! use viewstat_core::aggregation_types::ChartSeries;
//! use viewstat_core::types::VideoId;
//! use viewstat_terminal::output::get_formatter;
//!
//! let formatter = get_formatter(true);
//! let output = formatter.format_intervals(
//!     &VideoId::new("abc"),
//!     &[],
//!     &ChartSeries::default(),
//!     &chrono_tz::Tz::UTC,
//! );
//! assert!(output.contains("\"buckets\""));
//! ```

use chrono::{DateTime, Utc};
use colored::*;
use prettytable::{Cell, Row, Table, format, row};
use serde_json::{Value, json};
use tracing::warn;
use viewstat_core::aggregation_types::{ChartSeries, IntervalBucket, Period, VideoSummary};
use viewstat_core::types::VideoId;

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format the interval buckets and chart series of one video
    fn format_intervals(
        &self,
        video_id: &VideoId,
        buckets: &[IntervalBucket],
        series: &ChartSeries,
        tz: &chrono_tz::Tz,
    ) -> String;

    /// Format per-video summaries
    fn format_summaries(
        &self,
        summaries: &[VideoSummary],
        period: Option<Period>,
        tz: &chrono_tz::Tz,
    ) -> String;

    /// Format the list of videos with their observation counts
    fn format_videos(&self, videos: &[(VideoId, usize)]) -> String;
}

/// Table formatter for human-readable output
///
/// The in-progress interval is highlighted in red, mirroring the chart's
/// red "now" segment. Set `NO_COLOR` to disable colors.
pub struct TableFormatter {
    /// Whether to use colored output
    pub colored_output: bool,
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new(std::env::var("NO_COLOR").is_err())
    }
}

impl TableFormatter {
    /// Create a new TableFormatter
    pub fn new(colored_output: bool) -> Self {
        Self { colored_output }
    }

    /// Format a number with thousands separators
    fn format_number(n: u64) -> String {
        let s = n.to_string();
        let mut result = String::new();

        for (count, ch) in s.chars().rev().enumerate() {
            if count > 0 && count % 3 == 0 {
                result.push(',');
            }
            result.push(ch);
        }

        result.chars().rev().collect()
    }

    /// Format a datetime with the specified timezone
    fn format_datetime_with_tz(dt: &DateTime<Utc>, tz: &chrono_tz::Tz) -> String {
        dt.with_timezone(tz).format("%Y-%m-%d %H:%M %Z").to_string()
    }

    fn status_cell(&self, bucket: &IntervalBucket, reference_now: Option<DateTime<Utc>>) -> Cell {
        if !bucket.is_partial {
            let complete = reference_now.is_none_or(|now| bucket.is_complete(now));
            return Cell::new(if complete { "Complete" } else { "Open" });
        }
        let cell = Cell::new("IN PROGRESS");
        if self.colored_output {
            cell.style_spec("bFr")
        } else {
            cell
        }
    }

    fn highlight(&self, text: String) -> String {
        if self.colored_output {
            text.red().bold().to_string()
        } else {
            text
        }
    }
}

impl OutputFormatter for TableFormatter {
    fn format_intervals(
        &self,
        video_id: &VideoId,
        buckets: &[IntervalBucket],
        series: &ChartSeries,
        tz: &chrono_tz::Tz,
    ) -> String {
        let mut output = format!("Video: {video_id}\n");

        if buckets.is_empty() {
            output.push_str("No observations yet.\n");
            return output;
        }

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![
            b -> "Interval",
            b -> "Start",
            b -> "End",
            b -> "New Views",
            b -> "Status"
        ]);

        let reference_now = buckets.iter().rev().find(|b| b.is_partial).map(|b| b.end_time);
        for bucket in buckets {
            table.add_row(Row::new(vec![
                Cell::new(&bucket.label),
                Cell::new(&Self::format_datetime_with_tz(&bucket.start_time, tz)),
                Cell::new(&Self::format_datetime_with_tz(&bucket.end_time, tz)),
                Cell::new(&Self::format_number(bucket.delta_views)).style_spec("r"),
                self.status_cell(bucket, reference_now),
            ]));
        }

        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\nCompleted intervals: {} new views\n",
            Self::format_number(series.completed_views())
        ));
        if let Some(partial) = series.partial_point() {
            let label = format!("Now +{}", Self::format_number(partial.views));
            output.push_str(&format!("{} ({})\n", self.highlight(label), partial.interval));
        }

        output
    }

    fn format_summaries(
        &self,
        summaries: &[VideoSummary],
        period: Option<Period>,
        tz: &chrono_tz::Tz,
    ) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);

        let period_title = match period {
            Some(p) => format!("Views (last {p})"),
            None => "Views (period)".to_string(),
        };
        table.set_titles(Row::new(vec![
            Cell::new("Video").style_spec("b"),
            Cell::new("Total Views").style_spec("b"),
            Cell::new(&period_title).style_spec("b"),
            Cell::new("Samples").style_spec("b"),
            Cell::new("First Seen").style_spec("b"),
            Cell::new("Last Seen").style_spec("b"),
        ]));

        for summary in summaries {
            let in_period = summary
                .views_in_period
                .map(Self::format_number)
                .unwrap_or_else(|| "-".to_string());
            table.add_row(row![
                summary.video_id,
                r -> Self::format_number(summary.total_views),
                r -> in_period,
                r -> summary.observation_count,
                Self::format_datetime_with_tz(&summary.first_seen, tz),
                Self::format_datetime_with_tz(&summary.last_seen, tz)
            ]);
        }

        let total: u64 = summaries.iter().map(|s| s.total_views).sum();
        table.add_row(Row::new(vec![Cell::new(""); 6]));
        table.add_row(row![b -> "TOTAL", b -> Self::format_number(total), "", "", "", ""]);

        table.to_string()
    }

    fn format_videos(&self, videos: &[(VideoId, usize)]) -> String {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![b -> "Video", b -> "Samples"]);

        for (video_id, count) in videos {
            table.add_row(row![video_id, r -> count]);
        }

        table.to_string()
    }
}

/// JSON formatter for machine-readable output
///
/// The `chart` array is the renderer contract: `{interval, views, isPartial}`
/// records with the in-progress point flagged.
pub struct JsonFormatter;

impl JsonFormatter {
    fn render(value: &Value) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|e| {
            warn!("Failed to serialize JSON output: {e}");
            format!("{{\"error\":\"{e}\"}}")
        })
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_intervals(
        &self,
        video_id: &VideoId,
        buckets: &[IntervalBucket],
        series: &ChartSeries,
        _tz: &chrono_tz::Tz,
    ) -> String {
        let output = json!({
            "video_id": video_id.as_str(),
            "buckets": buckets.iter().map(|b| json!({
                "label": b.label,
                "start_time": b.start_time.to_rfc3339(),
                "end_time": b.end_time.to_rfc3339(),
                "delta_views": b.delta_views,
                "is_partial": b.is_partial,
            })).collect::<Vec<_>>(),
            "chart": series.points,
            "now_label": series.now_label(),
            "completed_views": series.completed_views(),
        });

        Self::render(&output)
    }

    fn format_summaries(
        &self,
        summaries: &[VideoSummary],
        period: Option<Period>,
        _tz: &chrono_tz::Tz,
    ) -> String {
        let output = json!({
            "period": period.map(|p| p.to_string()),
            "videos": summaries.iter().map(|s| json!({
                "video_id": s.video_id.as_str(),
                "total_views": s.total_views,
                "views_in_period": s.views_in_period,
                "observation_count": s.observation_count,
                "first_seen": s.first_seen.to_rfc3339(),
                "last_seen": s.last_seen.to_rfc3339(),
            })).collect::<Vec<_>>(),
            "total_views": summaries.iter().map(|s| s.total_views).sum::<u64>(),
        });

        Self::render(&output)
    }

    fn format_videos(&self, videos: &[(VideoId, usize)]) -> String {
        let output = json!({
            "videos": videos.iter().map(|(id, count)| json!({
                "video_id": id.as_str(),
                "observation_count": count,
            })).collect::<Vec<_>>(),
        });

        Self::render(&output)
    }
}

/// Get appropriate formatter based on JSON flag
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use viewstat_core::aggregation_types::ChartPoint;

    fn sample() -> (Vec<IntervalBucket>, ChartSeries) {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        let buckets = vec![
            IntervalBucket {
                label: "5/3 00:00".to_string(),
                start_time: t0,
                end_time: t0 + Duration::hours(6),
                delta_views: 1_250,
                is_partial: false,
            },
            IntervalBucket {
                label: "5/3 06:00".to_string(),
                start_time: t0 + Duration::hours(6),
                end_time: t0 + Duration::hours(12),
                delta_views: 70,
                is_partial: false,
            },
            IntervalBucket {
                label: "5/3 06:00".to_string(),
                start_time: t0 + Duration::hours(6),
                end_time: t0 + Duration::hours(7),
                delta_views: 70,
                is_partial: true,
            },
        ];
        let series = ChartSeries {
            points: vec![
                ChartPoint {
                    interval: "5/3 00:00".to_string(),
                    views: 1_250,
                    is_partial: false,
                    is_open: false,
                    is_placeholder: false,
                },
                ChartPoint {
                    interval: "5/3 06:00".to_string(),
                    views: 70,
                    is_partial: false,
                    is_open: true,
                    is_placeholder: false,
                },
                ChartPoint {
                    interval: "5/3 07:00".to_string(),
                    views: 70,
                    is_partial: true,
                    is_open: false,
                    is_placeholder: false,
                },
            ],
        };
        (buckets, series)
    }

    fn summary() -> VideoSummary {
        VideoSummary {
            video_id: VideoId::new("abc"),
            total_views: 1_234_567,
            first_seen: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            last_seen: Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap(),
            observation_count: 42,
            views_in_period: Some(9_000),
        }
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(TableFormatter::format_number(1234567), "1,234,567");
        assert_eq!(TableFormatter::format_number(999), "999");
        assert_eq!(TableFormatter::format_number(0), "0");
        assert_eq!(TableFormatter::format_number(1000), "1,000");
    }

    #[test]
    fn test_table_intervals() {
        let (buckets, series) = sample();
        let formatter = TableFormatter::new(false);
        let output =
            formatter.format_intervals(&VideoId::new("abc"), &buckets, &series, &chrono_tz::Tz::UTC);

        assert!(output.contains("Video: abc"));
        assert!(output.contains("5/3 00:00"));
        assert!(output.contains("1,250"));
        assert!(output.contains("IN PROGRESS"));
        assert!(output.contains("Complete"));
        assert!(output.contains("Open"));
        assert!(output.contains("2024-03-05 06:00 UTC"));
        assert!(output.contains("Now +70 (5/3 07:00)"));
        // The open 06:00 slot is reported once, through "Now +70"
        assert!(output.contains("Completed intervals: 1,250 new views"));
    }

    #[test]
    fn test_table_intervals_empty() {
        let formatter = TableFormatter::new(false);
        let output = formatter.format_intervals(
            &VideoId::new("abc"),
            &[],
            &ChartSeries::default(),
            &chrono_tz::Tz::UTC,
        );
        assert!(output.contains("No observations yet."));
    }

    #[test]
    fn test_table_summaries() {
        let formatter = TableFormatter::new(false);
        let output =
            formatter.format_summaries(&[summary()], Some(Period::Week), &chrono_tz::Tz::UTC);
        assert!(output.contains("Views (last week)"));
        assert!(output.contains("1,234,567"));
        assert!(output.contains("9,000"));
        assert!(output.contains("TOTAL"));

        let output = formatter.format_summaries(&[], None, &chrono_tz::Tz::UTC);
        assert!(output.contains("TOTAL"));
    }

    #[test]
    fn test_table_videos() {
        let formatter = TableFormatter::new(false);
        let output = formatter.format_videos(&[(VideoId::new("abc"), 3), (VideoId::new("xyz"), 10)]);
        assert!(output.contains("abc"));
        assert!(output.contains("xyz"));
        assert!(output.contains("10"));
    }

    #[test]
    fn test_json_intervals() {
        let (buckets, series) = sample();
        let output = JsonFormatter.format_intervals(
            &VideoId::new("abc"),
            &buckets,
            &series,
            &chrono_tz::Tz::UTC,
        );
        let parsed: Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["video_id"], "abc");
        assert_eq!(parsed["buckets"].as_array().unwrap().len(), 3);
        assert_eq!(parsed["buckets"][2]["is_partial"], true);
        assert_eq!(parsed["chart"][1]["isOpen"], true);
        assert_eq!(parsed["chart"][2]["isPartial"], true);
        assert_eq!(parsed["chart"][0]["views"], 1250);
        assert_eq!(parsed["now_label"], "+70 so far");
        assert_eq!(parsed["completed_views"], 1250);
    }

    #[test]
    fn test_json_summaries() {
        let output = JsonFormatter.format_summaries(
            &[summary()],
            Some(Period::Month),
            &chrono_tz::Tz::UTC,
        );
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["period"], "month");
        assert_eq!(parsed["videos"][0]["total_views"], 1_234_567);
        assert_eq!(parsed["videos"][0]["views_in_period"], 9_000);
        assert_eq!(parsed["total_views"], 1_234_567);
    }

    #[test]
    fn test_get_formatter() {
        let json_formatter = get_formatter(true);
        assert!(json_formatter.format_videos(&[]).contains("\"videos\""));

        let table_formatter = get_formatter(false);
        let output = table_formatter.format_videos(&[(VideoId::new("abc"), 1)]);
        assert!(output.contains("Samples"));
    }
}
