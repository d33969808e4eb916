//! PTG Ingest - schedule feed loader

use anyhow::{Context, Result};
use clap::Parser;
use ptg_common::logging::{init_logging, LogConfig, LogLevel};
use ptg_ingest::config::IngestConfigBuilder;
use ptg_ingest::{store, IngestConfig, SchedulePipeline};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ptg-ingest")]
#[command(author, version, about = "Polish rail schedule ingestion tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Parser, Debug)]
enum Command {
    /// Load the schedule feed into the database
    Schedules {
        /// Schedule feed file (.json or .json.gz)
        #[arg(short, long, env = "PTG_FEED_PATH")]
        feed: Option<PathBuf>,

        /// SQLite database file
        #[arg(short, long, env = "PTG_DATABASE_PATH")]
        database: Option<PathBuf>,

        /// First calendar id to mint
        #[arg(long, env = "PTG_CALENDAR_ID_BASE")]
        calendar_id_base: Option<u64>,

        /// Route blocks between progress lines, 0 disables them
        #[arg(long, env = "PTG_PROGRESS_INTERVAL")]
        progress_interval: Option<usize>,

        /// Expect the schedule tables to exist already
        #[arg(long)]
        no_init_schema: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("ptg-ingest")
        .build()
        .merge_env()?;

    let _guard = init_logging(&log_config)?;

    match cli.command {
        Command::Schedules {
            feed,
            database,
            calendar_id_base,
            progress_interval,
            no_init_schema,
        } => {
            let mut builder = IngestConfigBuilder::from_config(IngestConfig::from_env()?);
            if let Some(feed) = feed {
                builder = builder.feed_path(feed);
            }
            if let Some(database) = database {
                builder = builder.database_path(database);
            }
            if let Some(base) = calendar_id_base {
                builder = builder.calendar_id_base(base);
            }
            if let Some(interval) = progress_interval {
                builder = builder.progress_interval(interval);
            }
            if no_init_schema {
                builder = builder.init_schema(false);
            }
            let config = builder.build()?;

            info!(
                feed = %config.feed_path.display(),
                database = %config.database_path.display(),
                "Ingesting schedules"
            );

            let mut conn = store::open_database(&config.database_path).with_context(|| {
                format!("Failed to open database {}", config.database_path.display())
            })?;
            let feed_path = config.feed_path.clone();
            let stats = SchedulePipeline::new(config)
                .run(&mut conn)
                .with_context(|| format!("Failed to ingest {}", feed_path.display()))?;

            info!(
                trips = stats.trips,
                stop_times = stats.stop_times,
                calendars = stats.calendars,
                "Ingestion complete"
            );
        },
    }

    Ok(())
}
