//! Environment variable helpers shared by the `PTG_*` settings

use crate::error::{CommonError, Result};

/// Value of `name`, treating an empty variable as unset
pub fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Parse a boolean setting: 1/true/yes/on or 0/false/no/off, any case
pub fn parse_flag(setting: &'static str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(CommonError::invalid_setting(setting, value)),
    }
}
