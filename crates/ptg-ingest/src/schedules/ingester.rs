// Schedule ingester
//
// Turns route blocks into calendars, trips and stop times. Each block is
// processed completely (trip first, then its stops in feed order) before the
// next one is pulled from the feed, so memory use does not grow with the feed.

use crate::error::{IngestError, Result};
use crate::feed::{parse_operating_date, RouteBlock, RouteStop};
use crate::schedules::calendar::{Assignment, CalendarDeduplicator, CalendarId, ServiceDateSet};
use crate::schedules::models::{
    IngestStats, StopTimeExtraFields, StopTimeRecord, TripExtraFields, TripRecord,
};
use crate::schedules::naming::{first_non_empty, merge_number_and_name, title_case};
use crate::schedules::time::{format_time, parse_time};
use crate::store::ScheduleSink;
use tracing::{debug, info, info_span, warn};

/// Default number of route blocks between progress log lines
pub const DEFAULT_PROGRESS_INTERVAL: usize = 5_000;

pub struct ScheduleIngester {
    calendars: CalendarDeduplicator,
    progress_interval: usize,
}

impl ScheduleIngester {
    pub fn new(calendars: CalendarDeduplicator) -> Self {
        Self {
            calendars,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    /// Log progress every `interval` route blocks, 0 disables progress lines
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn calendars(&self) -> &CalendarDeduplicator {
        &self.calendars
    }

    /// Reset the calendar cache before an independent run
    pub fn clear(&mut self) {
        self.calendars.clear();
    }

    /// Consume every route block and write the derived rows to `sink`.
    ///
    /// Stops at the first error; the caller discards whatever the sink saw.
    pub fn ingest<I, S>(&mut self, blocks: I, sink: &mut S) -> Result<IngestStats>
    where
        I: IntoIterator<Item = Result<RouteBlock>>,
        S: ScheduleSink + ?Sized,
    {
        let span = info_span!("ingest_schedules", calendar_base = self.calendars.base());
        let _enter = span.enter();

        let minted_before = self.calendars.len();
        let mut stats = IngestStats::default();

        for (index, block) in blocks.into_iter().enumerate() {
            let block = block?;
            stats.stop_times += self.process_route(index, &block, sink)?;
            stats.trips += 1;
            stats.route_blocks += 1;

            if self.progress_interval > 0 && stats.route_blocks % self.progress_interval == 0 {
                info!(
                    route_blocks = stats.route_blocks,
                    stop_times = stats.stop_times,
                    calendars = self.calendars.len(),
                    "Ingestion progress"
                );
            }
        }

        stats.calendars = self.calendars.len() - minted_before;
        info!(
            route_blocks = stats.route_blocks,
            trips = stats.trips,
            stop_times = stats.stop_times,
            calendars = stats.calendars,
            "Schedules ingested"
        );
        Ok(stats)
    }

    /// Write the trip of one route block followed by its stop times.
    ///
    /// `index` is the block's position in the feed, used in error reports.
    /// Returns the number of stop times written.
    pub fn process_route<S>(&mut self, index: usize, block: &RouteBlock, sink: &mut S) -> Result<usize>
    where
        S: ScheduleSink + ?Sized,
    {
        let trip_id = block.schedule_id;
        let calendar_id = self.resolve_calendar(index, block, sink)?;

        let trip = TripRecord {
            trip_id,
            route_id: format!("{}_{}", block.carrier_code, block.category_symbol),
            calendar_id,
            short_name: short_name(block),
            extra_fields: TripExtraFields {
                order_id: block.order_id.to_string(),
                plk_train_number: block.national_number.clone().unwrap_or_default(),
            },
        };
        sink.insert_trip(&trip)?;

        let mut previous_sequence = None;
        for stop in &block.stops {
            let stop_time = stop_time(trip_id, stop)?;

            if stop_time.arrival_time > stop_time.departure_time {
                warn!(
                    trip_id,
                    stop_sequence = stop_time.stop_sequence,
                    arrival = %format_time(stop_time.arrival_time),
                    departure = %format_time(stop_time.departure_time),
                    "Arrival after departure"
                );
            }
            if previous_sequence.is_some_and(|prev| prev >= stop_time.stop_sequence) {
                warn!(
                    trip_id,
                    stop_sequence = stop_time.stop_sequence,
                    "Stop order does not increase"
                );
            }
            previous_sequence = Some(stop_time.stop_sequence);

            sink.insert_stop_time(&stop_time)?;
        }

        debug!(trip_id, short_name = %trip.short_name, stops = block.stops.len(), "Processed route");
        Ok(block.stops.len())
    }

    fn resolve_calendar<S>(&mut self, index: usize, block: &RouteBlock, sink: &mut S) -> Result<CalendarId>
    where
        S: ScheduleSink + ?Sized,
    {
        let dates = block
            .operating_dates
            .iter()
            .map(|raw| {
                parse_operating_date(raw).ok_or_else(|| {
                    IngestError::malformed(index, format!("invalid operating date {raw:?}"))
                })
            })
            .collect::<Result<ServiceDateSet>>()?;

        match self.calendars.assign(dates)? {
            Assignment::Existing(id) => Ok(id),
            Assignment::Minted(calendar) => {
                sink.insert_calendar(&calendar)?;
                Ok(calendar.id)
            },
        }
    }
}

impl Default for ScheduleIngester {
    fn default() -> Self {
        Self::new(CalendarDeduplicator::default())
    }
}

/// Display number (international departure, else international arrival, else
/// national) merged with the title-cased train name
fn short_name(block: &RouteBlock) -> String {
    let number = first_non_empty([
        block.international_departure_number.as_deref(),
        block.international_arrival_number.as_deref(),
        block.national_number.as_deref(),
    ])
    .unwrap_or_default();
    let name = title_case(block.name.as_deref().unwrap_or_default());
    merge_number_and_name(number, &name)
}

fn stop_time(trip_id: i64, stop: &RouteStop) -> Result<StopTimeRecord> {
    let arrival_time = parse_time(&stop.arrival_time, stop.arrival_day.unwrap_or(0))?;
    let departure_time = parse_time(&stop.departure_time, stop.departure_day.unwrap_or(0))?;

    let platform = first_non_empty([
        stop.departure_platform.as_deref(),
        stop.arrival_platform.as_deref(),
    ])
    .unwrap_or_default();
    let track = first_non_empty([stop.departure_track.as_deref(), stop.arrival_track.as_deref()])
        .unwrap_or_default();

    Ok(StopTimeRecord {
        trip_id,
        stop_sequence: stop.order,
        stop_id: stop.station_id,
        arrival_time,
        departure_time,
        platform: platform.to_string(),
        extra_fields: StopTimeExtraFields {
            track: track.to_string(),
        },
    })
}
