//! SQLite-backed [`ScheduleSink`]

use crate::error::Result;
use crate::schedules::calendar::Calendar;
use crate::schedules::models::{StopTimeRecord, TripRecord};
use crate::store::schema::EXCEPTION_ADDED;
use crate::store::ScheduleSink;
use rusqlite::{params, Connection};

const INSERT_CALENDAR: &str = "INSERT INTO calendars (calendar_id) VALUES (?1)";

const INSERT_CALENDAR_EXCEPTION: &str =
    "INSERT INTO calendar_exceptions (calendar_id, date, exception_type) VALUES (?1, ?2, ?3)";

const INSERT_TRIP: &str = r#"
    INSERT INTO trips (trip_id, route_id, calendar_id, short_name, extra_fields_json)
    VALUES (?1, ?2, ?3, ?4, ?5)
"#;

const INSERT_STOP_TIME: &str = r#"
    INSERT INTO stop_times (
        trip_id, stop_sequence, stop_id, arrival_time,
        departure_time, platform, extra_fields_json
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

/// Writes rows with cached prepared statements.
///
/// Pass the pipeline's `rusqlite::Transaction` (it derefs to `Connection`);
/// the sink itself never commits.
pub struct SqliteSink<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSink<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ScheduleSink for SqliteSink<'_> {
    fn insert_calendar(&mut self, calendar: &Calendar) -> Result<()> {
        self.conn
            .prepare_cached(INSERT_CALENDAR)?
            .execute(params![calendar.id.0])?;

        let mut stmt = self.conn.prepare_cached(INSERT_CALENDAR_EXCEPTION)?;
        for date in calendar.dates.iter() {
            stmt.execute(params![calendar.id.0, date.to_string(), EXCEPTION_ADDED])?;
        }
        Ok(())
    }

    fn insert_trip(&mut self, trip: &TripRecord) -> Result<()> {
        let extra_fields = serde_json::to_string(&trip.extra_fields)?;
        self.conn.prepare_cached(INSERT_TRIP)?.execute(params![
            trip.trip_id,
            trip.route_id,
            trip.calendar_id.0,
            trip.short_name,
            extra_fields,
        ])?;
        Ok(())
    }

    fn insert_stop_time(&mut self, stop_time: &StopTimeRecord) -> Result<()> {
        let extra_fields = serde_json::to_string(&stop_time.extra_fields)?;
        self.conn.prepare_cached(INSERT_STOP_TIME)?.execute(params![
            stop_time.trip_id,
            stop_time.stop_sequence,
            stop_time.stop_id,
            stop_time.arrival_time,
            stop_time.departure_time,
            stop_time.platform,
            extra_fields,
        ])?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use crate::schedules::calendar::{CalendarId, ServiceDateSet};
    use crate::schedules::models::{StopTimeExtraFields, TripExtraFields};
    use crate::store::schema::init_schema;
    use chrono::NaiveDate;

    fn calendar() -> Calendar {
        Calendar {
            id: CalendarId(3),
            dates: [
                NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
                NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            ]
            .into_iter()
            .collect::<ServiceDateSet>(),
        }
    }

    fn trip() -> TripRecord {
        TripRecord {
            trip_id: 1001,
            route_id: "IC_TLK".to_string(),
            calendar_id: CalendarId(3),
            short_name: "18107 Hetman".to_string(),
            extra_fields: TripExtraFields {
                order_id: "77".to_string(),
                plk_train_number: "18107".to_string(),
            },
        }
    }

    #[test]
    fn test_rows_are_written() {
        let mut conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let tx = conn.transaction().unwrap();
        let mut sink = SqliteSink::new(&tx);
        sink.insert_calendar(&calendar()).unwrap();
        sink.insert_trip(&trip()).unwrap();
        sink.insert_stop_time(&StopTimeRecord {
            trip_id: 1001,
            stop_sequence: 1,
            stop_id: 5100065,
            arrival_time: 19_800,
            departure_time: 19_860,
            platform: "II".to_string(),
            extra_fields: StopTimeExtraFields {
                track: "4".to_string(),
            },
        })
        .unwrap();
        tx.commit().unwrap();

        let dates: Vec<(i64, String, i64)> = conn
            .prepare("SELECT calendar_id, date, exception_type FROM calendar_exceptions ORDER BY date")
            .unwrap()
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        assert_eq!(
            dates,
            vec![
                (3, "2026-02-01".to_string(), 1),
                (3, "2026-02-02".to_string(), 1)
            ]
        );

        let (short_name, extra): (String, String) = conn
            .query_row("SELECT short_name, extra_fields_json FROM trips", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(short_name, "18107 Hetman");
        let extra: serde_json::Value = serde_json::from_str(&extra).unwrap();
        assert_eq!(extra["plk_train_number"], "18107");

        let (platform, extra): (String, String) = conn
            .query_row("SELECT platform, extra_fields_json FROM stop_times", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(platform, "II");
        assert_eq!(extra, r#"{"track":"4"}"#);
    }

    #[test]
    fn test_duplicate_trip_is_a_store_failure() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let mut sink = SqliteSink::new(&conn);
        sink.insert_calendar(&calendar()).unwrap();
        sink.insert_trip(&trip()).unwrap();
        let err = sink.insert_trip(&trip()).unwrap_err();
        assert!(matches!(err, IngestError::StoreWriteFailure(_)));
    }
}
