//! PTG Ingest Library
//!
//! Loads the national rail schedule feed into the `calendars`,
//! `calendar_exceptions`, `trips` and `stop_times` tables of a SQLite database.
//!
//! The feed is read one route block at a time, so a multi-gigabyte feed is
//! ingested in constant memory. A run is atomic: either every row of the feed
//! is committed or none is.
//!
//! # Example
//!
//! ```no_run
//! use ptg_ingest::{store, IngestConfig, SchedulePipeline};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = IngestConfig::builder()
//!         .feed_path("data/schedules.json.gz")
//!         .database_path("data/ptg.sqlite3")
//!         .build()?;
//!
//!     let mut conn = store::open_database(&config.database_path)?;
//!     let stats = SchedulePipeline::new(config).run(&mut conn)?;
//!     println!("{} trips", stats.trips);
//!     Ok(())
//! }
//! ```
#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod error;
pub mod feed;
pub mod pipeline;
pub mod schedules;
pub mod store;

pub use config::IngestConfig;
pub use error::{IngestError, Result};
pub use pipeline::SchedulePipeline;
pub use schedules::IngestStats;
