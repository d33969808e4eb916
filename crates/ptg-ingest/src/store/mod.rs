//! Store boundary
//!
//! The ingester only talks to a [`ScheduleSink`]. The SQLite implementation
//! writes through a single transaction owned by the pipeline, which is what
//! makes a run all-or-nothing.

pub mod schema;
pub mod sqlite;

pub use schema::init_schema;
pub use sqlite::SqliteSink;

use crate::error::Result;
use crate::schedules::calendar::Calendar;
use crate::schedules::models::{StopTimeRecord, TripRecord};
use rusqlite::Connection;
use std::path::Path;
use tracing::debug;

/// Destination for the rows derived from the feed.
///
/// Implementations must not make rows visible before the surrounding unit of
/// work commits.
pub trait ScheduleSink {
    /// Write a calendar and one added-service exception per date
    fn insert_calendar(&mut self, calendar: &Calendar) -> Result<()>;

    fn insert_trip(&mut self, trip: &TripRecord) -> Result<()>;

    fn insert_stop_time(&mut self, stop_time: &StopTimeRecord) -> Result<()>;
}

/// Open (or create) the schedule database
pub fn open_database(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(path)?;
    conn.pragma_update(None, "foreign_keys", true)?;
    debug!(path = %path.display(), "Opened schedule database");
    Ok(conn)
}
