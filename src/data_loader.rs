//! Data loader for observation files
//!
//! Observations are recorded by an external poller. This module locates the
//! recorded file and streams its records as [`VideoObservation`]s.
//!
//! Two layouts are accepted:
//! - `.jsonl`: one [`RawObservation`] per line
//! - `.json`: a single array of [`RawObservation`] records
//!
//! The file is resolved in this order: an explicit path, the
//! `VIEWSTAT_DATA_PATH` environment variable, then
//! `<data dir>/viewstat/observations.jsonl`.
//!
//! # Examples
//!
//! ```no_run
//! use viewstat::data_loader::{DataLoader, ObservationSource};
//! use futures::StreamExt;
//!
//! # async fn example() -> viewstat::Result<()> {
//! let loader = DataLoader::new(None).await?;
//!
//! let entries = loader.load_observations();
//! tokio::pin!(entries);
//! while let Some(result) = entries.next().await {
//!     let entry = result?;
//!     println!("{} {} {}", entry.video_id, entry.observation.timestamp, entry.observation.cumulative_views);
//! }
//! # Ok(())
//! # }
//! ```

use crate::aggregation::group_by_video;
use crate::error::{Result, ViewstatError};
use crate::types::{Observation, RawObservation, VideoId, VideoObservation};
use async_trait::async_trait;
use futures::stream::Stream;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

/// Environment variable overriding the observation file location
pub const DATA_PATH_ENV: &str = "VIEWSTAT_DATA_PATH";

/// Boxed stream of tagged observations
pub type ObservationStream<'a> = Pin<Box<dyn Stream<Item = Result<VideoObservation>> + Send + 'a>>;

/// Anything that can supply recorded observations
///
/// The aggregator never talks to a source directly; callers drain a source
/// into per-video lists and hand those over.
#[async_trait]
pub trait ObservationSource: Send + Sync {
    /// Stream every recorded observation
    fn load_observations(&self) -> ObservationStream<'_>;

    /// Drain the source into per-video lists
    async fn load_by_video(&self) -> Result<BTreeMap<VideoId, Vec<Observation>>> {
        group_by_video(self.load_observations()).await
    }
}

/// Loader for a JSON or JSONL observation file
#[derive(Debug, Clone)]
pub struct DataLoader {
    path: PathBuf,
}

impl DataLoader {
    /// Create a loader for `path`, or for the discovered default location
    ///
    /// # Errors
    ///
    /// Returns `ViewstatError::NoDataFile` if the resolved file does not exist.
    pub async fn new(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::discover_data_path(),
        };

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(ViewstatError::NoDataFile(path));
        }

        debug!("Loading observations from {}", path.display());
        Ok(Self { path })
    }

    /// Resolve the default observation file location
    fn discover_data_path() -> PathBuf {
        if let Ok(custom_path) = std::env::var(DATA_PATH_ENV) {
            return PathBuf::from(custom_path);
        }

        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("viewstat")
            .join("observations.jsonl")
    }

    /// Get the resolved file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse a JSONL file as a stream
    ///
    /// Lines that are not valid records are logged and skipped. A record
    /// whose timestamp cannot be parsed is yielded as an error.
    fn parse_jsonl_stream(path: PathBuf) -> impl Stream<Item = Result<VideoObservation>> + Send {
        async_stream::stream! {
            let file = match tokio::fs::File::open(&path).await {
                Ok(f) => f,
                Err(e) => {
                    yield Err(e.into());
                    return;
                }
            };

            let reader = BufReader::new(file);
            let mut lines = reader.lines();
            let mut line_number = 0;

            loop {
                let line = match lines.next_line().await {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        yield Err(e.into());
                        return;
                    }
                };
                line_number += 1;

                if line.trim().is_empty() {
                    continue;
                }

                match serde_json::from_str::<RawObservation>(&line) {
                    Ok(raw) => yield raw.into_video_observation(),
                    Err(e) => {
                        warn!(
                            "Failed to parse line {} in {}: {}",
                            line_number,
                            path.display(),
                            e
                        );
                    }
                }
            }
        }
    }

    /// Parse a JSON array file as a stream
    fn parse_json_array_stream(path: PathBuf) -> impl Stream<Item = Result<VideoObservation>> + Send {
        async_stream::stream! {
            let contents = match tokio::fs::read_to_string(&path).await {
                Ok(contents) => contents,
                Err(e) => {
                    yield Err(e.into());
                    return;
                }
            };

            let records: Vec<RawObservation> = match serde_json::from_str(&contents) {
                Ok(records) => records,
                Err(e) => {
                    yield Err(ViewstatError::Parse {
                        file: path.clone(),
                        error: e.to_string(),
                    });
                    return;
                }
            };

            for raw in records {
                yield raw.into_video_observation();
            }
        }
    }

    fn is_json_array_file(&self) -> bool {
        self.path.extension().and_then(|s| s.to_str()) == Some("json")
    }
}

#[async_trait]
impl ObservationSource for DataLoader {
    fn load_observations(&self) -> ObservationStream<'_> {
        let path = self.path.clone();
        if self.is_json_array_file() {
            Box::pin(Self::parse_json_array_stream(path))
        } else {
            Box::pin(Self::parse_jsonl_stream(path))
        }
    }
}

/// In-memory source, handy for tests and for callers that already hold records
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<VideoObservation>,
}

impl MemorySource {
    /// Create a source over `records`
    pub fn new(records: Vec<VideoObservation>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl ObservationSource for MemorySource {
    fn load_observations(&self) -> ObservationStream<'_> {
        Box::pin(futures::stream::iter(self.records.iter().cloned().map(Ok)))
    }
}
