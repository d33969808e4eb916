// Output records produced by the schedule ingester

use crate::schedules::calendar::CalendarId;
use serde::Serialize;

/// One trip per route block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripRecord {
    pub trip_id: i64,

    /// `{carrier code}_{commercial category symbol}`
    pub route_id: String,

    pub calendar_id: CalendarId,
    pub short_name: String,
    pub extra_fields: TripExtraFields,
}

/// Carrier-specific trip data kept out of first-class columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TripExtraFields {
    pub order_id: String,
    pub plk_train_number: String,
}

/// One stop time per stop of a route block, in feed order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopTimeRecord {
    pub trip_id: i64,

    /// Taken verbatim from the feed's `ord`
    pub stop_sequence: u32,

    pub stop_id: i64,

    /// Seconds since the start of the service day
    pub arrival_time: u32,
    pub departure_time: u32,

    pub platform: String,
    pub extra_fields: StopTimeExtraFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopTimeExtraFields {
    pub track: String,
}

/// Counters reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub route_blocks: usize,
    pub trips: usize,
    pub stop_times: usize,
    pub calendars: usize,
}
