//! viewstat - Turn cumulative video view counts into chart-ready interval series
//!
//! This library provides functionality to:
//! - Load cumulative view-count observations recorded for one or more videos
//! - Resample them onto a fixed-width interval grid of "new views" deltas
//! - Flag the in-progress interval so renderers can highlight it
//! - Summarize totals and trailing-window gains per video
//!
//! # Examples
//!
//! ```no_run
//! use viewstat::{
//!     aggregation::IntervalAggregator,
//!     data_loader::{DataLoader, ObservationSource},
//!     interval::IntervalWidth,
//!     timezone::TimezoneConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> viewstat::Result<()> {
//!     let loader = DataLoader::new(None).await?;
//!     let by_video = loader.load_by_video().await?;
//!
//!     let aggregator = IntervalAggregator::new(IntervalWidth::default(), TimezoneConfig::default());
//!     for (video_id, observations) in &by_video {
//!         let buckets = aggregator.aggregate(observations, chrono::Utc::now());
//!         println!("{video_id}: {} buckets", buckets.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod aggregation;
pub mod cli;
pub mod data_loader;
pub mod filters;
pub mod series;

// Re-export core and terminal modules under the crate root
pub use viewstat_core::{aggregation_types, error, interval, timezone, types};
pub use viewstat_terminal::output;

// Re-export commonly used types
pub use error::{Result, ViewstatError};
pub use types::{Observation, RawObservation, VideoId, VideoObservation};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
