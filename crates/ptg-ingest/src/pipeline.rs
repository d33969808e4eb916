// Schedule ingestion pipeline
//
// feed file -> FeedReader -> ScheduleIngester -> SqliteSink, all inside one
// SQLite transaction. The transaction is committed after the last route block;
// returning early on any error drops it, which rolls the whole run back.

use crate::config::IngestConfig;
use crate::error::Result;
use crate::feed::{open_feed, FeedReader};
use crate::schedules::calendar::CalendarDeduplicator;
use crate::schedules::ingester::ScheduleIngester;
use crate::schedules::models::IngestStats;
use crate::store::{init_schema, SqliteSink};
use rusqlite::Connection;
use std::io::BufRead;
use std::time::Instant;
use tracing::{info, info_span};

/// Schedule ingestion pipeline
pub struct SchedulePipeline {
    config: IngestConfig,
}

impl SchedulePipeline {
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    /// Ingest the configured feed file into `conn`
    pub fn run(&self, conn: &mut Connection) -> Result<IngestStats> {
        self.config.validate()?;
        let feed = open_feed(&self.config.feed_path)?;
        self.ingest(conn, feed)
    }

    /// Ingest a feed from an already opened reader
    pub fn run_reader<R: BufRead>(&self, conn: &mut Connection, reader: R) -> Result<IngestStats> {
        self.config.validate()?;
        let feed = FeedReader::new(reader)?;
        self.ingest(conn, feed)
    }

    fn ingest<R: BufRead>(&self, conn: &mut Connection, feed: FeedReader<R>) -> Result<IngestStats> {
        let span = info_span!("schedule_pipeline", feed = %self.config.feed_path.display());
        let _enter = span.enter();
        let started = Instant::now();

        if self.config.init_schema {
            init_schema(conn)?;
        }

        // A fresh deduplicator per run, so ids never leak between runs
        let mut ingester = ScheduleIngester::new(CalendarDeduplicator::new(self.config.calendar_id_base))
            .with_progress_interval(self.config.progress_interval);

        let tx = conn.transaction()?;
        let stats = {
            let mut sink = SqliteSink::new(&tx);
            ingester.ingest(feed, &mut sink)?
        };
        tx.commit()?;

        info!(
            route_blocks = stats.route_blocks,
            trips = stats.trips,
            stop_times = stats.stop_times,
            calendars = stats.calendars,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Schedule ingestion committed"
        );
        Ok(stats)
    }
}
