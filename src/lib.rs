//! # Activity Heatmap
//!
//! Calendar activity heatmaps from dated records.
//!
//! This crate provides:
//! - Day bucketing of timestamped records into per-day counts
//! - Level classification with fixed or max-normalised thresholds
//! - Gradient and palette colouring of cells
//! - Week-aligned month grids with padding and day-tap lookup
//! - Activity summaries and streaks
//! - Haversine distance and nearby-place ranking

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod analytics;
pub mod bucket;
pub mod color;
pub mod config;
pub mod date_range;
pub mod display;
pub mod error;
pub mod geo;
pub mod grid;
pub mod heatmap;
pub mod level;
pub mod types;

pub use bucket::{bucket, bucket_with_report, ActivityMap, EventRecord, Timestamp};
pub use config::Config;
pub use error::{Error, Result};
pub use grid::{GridCell, MonthGrid, MonthGridBuilder};
pub use heatmap::Heatmap;
pub use level::{Classifier, LevelPolicy};
pub use types::{ActivityCount, Level};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "activity-heatmap";
