//! Schedule transformation
//!
//! Route blocks become one trip and its stop times each; identical operating
//! date sets share one calendar.

pub mod calendar;
pub mod ingester;
pub mod models;
pub mod naming;
pub mod time;

pub use calendar::{Assignment, Calendar, CalendarDeduplicator, CalendarId, ServiceDateSet};
pub use ingester::ScheduleIngester;
pub use models::{IngestStats, StopTimeRecord, TripRecord};
