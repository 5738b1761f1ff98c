//! Common test utilities and helpers for viewstat tests
//!
//! Observation builders anchored on a fixed instant, plus helpers that write
//! observation files into temporary directories.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use once_cell::sync::Lazy;
use std::path::PathBuf;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use viewstat::types::{Observation, VideoId, VideoObservation};

// Global mutex to serialize environment variable modifications in tests
pub static ENV_MUTEX: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

/// 2024-03-05 00:00:00 UTC, a grid boundary for every width dividing 24
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap()
}

/// Observation `hours` after [`t0`]
pub fn obs(hours: i64, views: u64) -> Observation {
    Observation::new(t0() + Duration::hours(hours), views)
}

/// Observation `minutes` after [`t0`]
pub fn obs_min(minutes: i64, views: u64) -> Observation {
    Observation::new(t0() + Duration::minutes(minutes), views)
}

/// Builder for observation records of one video
pub struct ObservationBuilder {
    video_id: String,
    records: Vec<(DateTime<Utc>, Option<u64>)>,
}

impl ObservationBuilder {
    pub fn new(video_id: &str) -> Self {
        Self {
            video_id: video_id.to_string(),
            records: Vec::new(),
        }
    }

    /// Add a sample `hours` after [`t0`]
    pub fn at_hour(mut self, hours: i64, views: u64) -> Self {
        self.records.push((t0() + Duration::hours(hours), Some(views)));
        self
    }

    /// Add a sample with the view count missing
    pub fn without_views(mut self, hours: i64) -> Self {
        self.records.push((t0() + Duration::hours(hours), None));
        self
    }

    /// Tagged observations, missing counts read as zero
    pub fn build(&self) -> Vec<VideoObservation> {
        self.records
            .iter()
            .map(|(timestamp, views)| VideoObservation {
                video_id: VideoId::new(self.video_id.as_str()),
                observation: Observation::new(*timestamp, views.unwrap_or(0)),
            })
            .collect()
    }

    /// Records as JSONL lines in the collector's wire format
    pub fn to_jsonl_lines(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|(timestamp, views)| {
                let mut record = serde_json::json!({
                    "videoId": self.video_id,
                    "timestamp": timestamp.to_rfc3339(),
                });
                if let Some(views) = views {
                    record["views"] = serde_json::json!(views);
                }
                record.to_string()
            })
            .collect()
    }
}

/// Write lines into `name` inside a fresh temporary directory
///
/// The directory must be kept alive for as long as the file is read.
pub async fn write_fixture(name: &str, lines: &[String]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(name);

    let mut file = tokio::fs::File::create(&path).await.unwrap();
    for line in lines {
        file.write_all(line.as_bytes()).await.unwrap();
        file.write_all(b"\n").await.unwrap();
    }
    file.flush().await.unwrap();

    (dir, path)
}
