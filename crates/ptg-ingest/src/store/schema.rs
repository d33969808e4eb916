//! SQLite schema for the schedule tables
//!
//! Column names are a contract with the tooling that exports the database,
//! keep them stable.

use crate::error::Result;
use rusqlite::Connection;

/// `calendar_exceptions.exception_type` for "service runs on this date"
pub const EXCEPTION_ADDED: i64 = 1;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS calendars (
    calendar_id INTEGER PRIMARY KEY
);

CREATE TABLE IF NOT EXISTS calendar_exceptions (
    calendar_id INTEGER NOT NULL REFERENCES calendars(calendar_id),
    date TEXT NOT NULL,
    exception_type INTEGER NOT NULL CHECK (exception_type IN (1, 2)),
    PRIMARY KEY (calendar_id, date)
);

CREATE TABLE IF NOT EXISTS trips (
    trip_id INTEGER PRIMARY KEY,
    route_id TEXT NOT NULL,
    calendar_id INTEGER NOT NULL REFERENCES calendars(calendar_id),
    short_name TEXT NOT NULL DEFAULT '',
    extra_fields_json TEXT
);

CREATE TABLE IF NOT EXISTS stop_times (
    trip_id INTEGER NOT NULL REFERENCES trips(trip_id),
    stop_sequence INTEGER NOT NULL,
    stop_id INTEGER NOT NULL,
    arrival_time INTEGER NOT NULL,
    departure_time INTEGER NOT NULL,
    platform TEXT NOT NULL DEFAULT '',
    extra_fields_json TEXT,
    PRIMARY KEY (trip_id, stop_sequence)
);
"#;

/// Create the schedule tables if they do not exist yet
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
