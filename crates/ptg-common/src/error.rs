//! Error types shared across PTG crates

use thiserror::Error;

/// Result type alias for shared PTG operations
pub type Result<T> = std::result::Result<T, CommonError>;

#[derive(Error, Debug)]
pub enum CommonError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid value {value:?} for {setting}")]
    InvalidSetting { setting: &'static str, value: String },

    #[error("Invalid filter directive: {0}")]
    FilterDirective(#[from] tracing_subscriber::filter::ParseError),

    #[error("Logging already initialised: {0}")]
    SubscriberInit(#[from] tracing_subscriber::util::TryInitError),
}

impl CommonError {
    pub fn invalid_setting(setting: &'static str, value: impl Into<String>) -> Self {
        CommonError::InvalidSetting {
            setting,
            value: value.into(),
        }
    }
}
