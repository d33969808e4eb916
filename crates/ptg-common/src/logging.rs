//! Logging configuration and initialization
//!
//! Every PTG binary logs through `tracing`. This module turns a [`LogConfig`]
//! into a global subscriber with:
//!
//! - console output (stderr), a daily rolling log file, or both
//! - human-readable text or JSON lines
//! - a level plus extra `EnvFilter` directives (`RUST_LOG` is honoured too)
//!
//! Library code only uses the macros (`trace!` .. `error!`) with structured
//! fields, e.g. `info!(route_blocks = n, "feed processed")`.
//!
//! # Example
//!
//! ```no_run
//! use ptg_common::logging::{init_logging, LogConfig, LogLevel};
//!
//! let config = LogConfig::builder().level(LogLevel::Debug).build();
//! let _guard = init_logging(&config).unwrap();
//! tracing::debug!("logging is up");
//! ```

use crate::env::{parse_flag, var as env_var};
use crate::error::{CommonError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Verbosity threshold, named after the `tracing` levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    const LEVELS: [(LogLevel, Level); 5] = [
        (LogLevel::Trace, Level::TRACE),
        (LogLevel::Debug, Level::DEBUG),
        (LogLevel::Info, Level::INFO),
        (LogLevel::Warn, Level::WARN),
        (LogLevel::Error, Level::ERROR),
    ];

    pub fn to_tracing_level(self) -> Level {
        Self::LEVELS[self as usize].1
    }
}

impl From<Level> for LogLevel {
    fn from(level: Level) -> Self {
        Self::LEVELS
            .iter()
            .find(|(_, l)| *l == level)
            .map_or(LogLevel::Info, |(ours, _)| *ours)
    }
}

impl std::str::FromStr for LogLevel {
    type Err = CommonError;

    /// Accepts the `tracing` spellings (any case, or 1-5) plus "warning"
    fn from_str(s: &str) -> Result<Self> {
        let name = if s.eq_ignore_ascii_case("warning") { "warn" } else { s };
        name.parse::<Level>()
            .map(LogLevel::from)
            .map_err(|_| CommonError::invalid_setting("log level", s))
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_tracing_level().as_str().to_ascii_lowercase())
    }
}

/// Where log lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// stderr only, so stdout stays free for command output
    #[default]
    Console,
    File,
    Both,
}

impl LogOutput {
    fn console(self) -> bool {
        matches!(self, LogOutput::Console | LogOutput::Both)
    }

    fn file(self) -> bool {
        matches!(self, LogOutput::File | LogOutput::Both)
    }
}

impl std::str::FromStr for LogOutput {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "console" | "stderr" => Ok(LogOutput::Console),
            "file" => Ok(LogOutput::File),
            "both" | "all" => Ok(LogOutput::Both),
            _ => Err(CommonError::invalid_setting("log output", s)),
        }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(CommonError::invalid_setting("log format", s)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: LogLevel,
    pub output: LogOutput,
    pub format: LogFormat,

    /// Directory for rolling log files (only used when output includes a file)
    pub log_dir: PathBuf,

    /// Log file name prefix, "ptg-ingest" -> "ptg-ingest.2026-01-18"
    pub log_file_prefix: String,

    /// Extra `EnvFilter` directives, e.g. "ptg_ingest::feed=trace"
    pub filter_directives: Option<String>,

    pub include_location: bool,
    pub include_thread_ids: bool,
    pub include_targets: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            output: LogOutput::Console,
            format: LogFormat::Text,
            log_dir: PathBuf::from("./logs"),
            log_file_prefix: "ptg".to_string(),
            filter_directives: None,
            include_location: false,
            include_thread_ids: false,
            include_targets: true,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables, starting from defaults
    ///
    /// - `PTG_LOG_LEVEL`: trace, debug, info, warn, error
    /// - `PTG_LOG_OUTPUT`: console, file, both
    /// - `PTG_LOG_FORMAT`: text, json
    /// - `PTG_LOG_DIR`, `PTG_LOG_FILE_PREFIX`, `PTG_LOG_FILTER`
    /// - `PTG_LOG_INCLUDE_LOCATION`, `PTG_LOG_INCLUDE_THREAD_IDS`,
    ///   `PTG_LOG_INCLUDE_TARGETS`: true/false
    pub fn from_env() -> Result<Self> {
        Self::default().merge_env()
    }

    /// Override fields of `self` with whatever `PTG_LOG_*` variables are set
    pub fn merge_env(mut self) -> Result<Self> {
        if let Some(level) = env_var("PTG_LOG_LEVEL") {
            self.level = level.parse()?;
        }
        if let Some(output) = env_var("PTG_LOG_OUTPUT") {
            self.output = output.parse()?;
        }
        if let Some(format) = env_var("PTG_LOG_FORMAT") {
            self.format = format.parse()?;
        }
        if let Some(dir) = env_var("PTG_LOG_DIR") {
            self.log_dir = PathBuf::from(dir);
        }
        if let Some(prefix) = env_var("PTG_LOG_FILE_PREFIX") {
            self.log_file_prefix = prefix;
        }
        if let Some(filter) = env_var("PTG_LOG_FILTER") {
            self.filter_directives = Some(filter);
        }
        if let Some(val) = env_var("PTG_LOG_INCLUDE_LOCATION") {
            self.include_location = parse_flag("PTG_LOG_INCLUDE_LOCATION", &val)?;
        }
        if let Some(val) = env_var("PTG_LOG_INCLUDE_THREAD_IDS") {
            self.include_thread_ids = parse_flag("PTG_LOG_INCLUDE_THREAD_IDS", &val)?;
        }
        if let Some(val) = env_var("PTG_LOG_INCLUDE_TARGETS") {
            self.include_targets = parse_flag("PTG_LOG_INCLUDE_TARGETS", &val)?;
        }
        Ok(self)
    }

    pub fn builder() -> LogConfigBuilder {
        LogConfigBuilder::default()
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        let mut filter =
            EnvFilter::from_default_env().add_directive(self.level.to_tracing_level().into());

        if let Some(ref directives) = self.filter_directives {
            for directive in directives.split(',').map(str::trim).filter(|d| !d.is_empty()) {
                filter = filter.add_directive(directive.parse()?);
            }
        }

        Ok(filter)
    }

    fn fmt_layer<W>(&self, writer: W, ansi: bool) -> BoxedLayer
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(self.include_targets)
            .with_thread_ids(self.include_thread_ids)
            .with_file(self.include_location)
            .with_line_number(self.include_location)
            .with_span_events(FmtSpan::CLOSE);

        match self.format {
            LogFormat::Text => layer.boxed(),
            LogFormat::Json => layer.json().boxed(),
        }
    }
}

/// Generates a by-value setter on [`LogConfigBuilder`]
macro_rules! setter {
    ($(#[$doc:meta])* $name:ident: impl Into<$ty:ty>) => {
        $(#[$doc])*
        pub fn $name(mut self, $name: impl Into<$ty>) -> Self {
            self.config.$name = $name.into();
            self
        }
    };
    ($(#[$doc:meta])* $name:ident: $ty:ty) => {
        $(#[$doc])*
        pub fn $name(mut self, $name: $ty) -> Self {
            self.config.$name = $name;
            self
        }
    };
}

/// Fluent construction of a [`LogConfig`], starting from the defaults
#[derive(Debug, Default)]
pub struct LogConfigBuilder {
    config: LogConfig,
}

impl LogConfigBuilder {
    setter!(level: LogLevel);
    setter!(output: LogOutput);
    setter!(format: LogFormat);
    setter!(log_dir: impl Into<PathBuf>);
    setter!(log_file_prefix: impl Into<String>);
    setter!(include_location: bool);
    setter!(include_thread_ids: bool);
    setter!(include_targets: bool);

    /// Comma-separated `EnvFilter` directives added on top of the level
    pub fn filter_directives(mut self, directives: impl Into<String>) -> Self {
        self.config.filter_directives = Some(directives.into());
        self
    }

    pub fn build(self) -> LogConfig {
        self.config
    }
}

/// Keeps the non-blocking file writer flushing until dropped.
///
/// Hold it in `main` for the lifetime of the program.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file_writer: Option<WorkerGuard>,
}

/// Install the global subscriber described by `config`.
///
/// Fails if a global subscriber is already set or a filter directive is invalid.
pub fn init_logging(config: &LogConfig) -> Result<LoggingGuard> {
    let filter = config.env_filter()?;
    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);
    let mut file_writer = None;

    if config.output.console() {
        layers.push(config.fmt_layer(std::io::stderr, true));
    }

    if config.output.file() {
        std::fs::create_dir_all(&config.log_dir)?;
        let appender = tracing_appender::rolling::daily(&config.log_dir, &config.log_file_prefix);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        layers.push(config.fmt_layer(non_blocking, false));
        file_writer = Some(guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()?;

    Ok(LoggingGuard {
        _file_writer: file_writer,
    })
}
