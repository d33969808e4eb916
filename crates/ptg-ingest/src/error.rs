//! Error types for schedule ingestion
//!
//! Every variant is fatal for the run that produced it: the pipeline drops
//! its store transaction and nothing from that run becomes visible.

use thiserror::Error;

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Error, Debug)]
pub enum IngestError {
    /// A route block (or the envelope around the route block array) could not be decoded
    #[error("Malformed feed at route block {index}: {message}")]
    MalformedFeed { index: usize, message: String },

    /// A time string is neither `HH:MM` nor `HH:MM:SS`
    #[error("Invalid time format: {value:?}")]
    InvalidTimeFormat { value: String },

    /// The next calendar id does not fit the store's signed 64-bit column
    #[error("Calendar id {id} is out of range")]
    CalendarIdOutOfRange { id: u64 },

    #[error("Store write failure: {0}")]
    StoreWriteFailure(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl IngestError {
    pub fn malformed(index: usize, message: impl Into<String>) -> Self {
        IngestError::MalformedFeed {
            index,
            message: message.into(),
        }
    }

    pub fn invalid_time(value: impl Into<String>) -> Self {
        IngestError::InvalidTimeFormat {
            value: value.into(),
        }
    }
}
