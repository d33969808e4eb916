//! Feed time codec.
//!
//! The feed gives each arrival and departure as a time of day (`HH:MM` or
//! `HH:MM:SS`) plus a day offset counted from the nominal start of the run.
//! Stop times are stored as seconds since the start of the service day, so a
//! stop reached at 00:40 on the following day becomes `24:40:00`.

use crate::error::{IngestError, Result};

pub const MINUTE: u32 = 60;
pub const HOUR: u32 = 60 * MINUTE;
pub const DAY: u32 = 24 * HOUR;

/// Convert a feed time and its day offset into seconds since service start.
///
/// The hour has two or more digits and is not bounded, minutes and seconds
/// have exactly two digits. Anything else, including a result that does not
/// fit in `u32`, is `InvalidTimeFormat`.
///
/// ```
/// use ptg_ingest::schedules::time::parse_time;
///
/// assert_eq!(parse_time("05:30", 0).unwrap(), 19_800);
/// assert_eq!(parse_time("05:30", 1).unwrap(), 19_800 + 86_400);
/// assert!(parse_time("5:3", 0).is_err());
/// ```
pub fn parse_time(text: &str, day_offset: u32) -> Result<u32> {
    let invalid = || IngestError::invalid_time(text);

    let mut fields = text.split(':');
    let hour = fields.next().ok_or_else(invalid)?;
    let minute = fields.next().ok_or_else(invalid)?;
    let second = fields.next();
    if fields.next().is_some() {
        return Err(invalid());
    }

    if hour.len() < 2 || minute.len() != 2 || second.is_some_and(|s| s.len() != 2) {
        return Err(invalid());
    }

    let hour = digits(hour).ok_or_else(invalid)?;
    let minute = digits(minute).ok_or_else(invalid)?;
    let second = match second {
        Some(s) => digits(s).ok_or_else(invalid)?,
        None => 0,
    };

    day_offset
        .checked_mul(24)
        .and_then(|h| h.checked_add(hour))
        .and_then(|h| h.checked_mul(HOUR))
        .and_then(|s| s.checked_add(minute * MINUTE + second))
        .ok_or_else(invalid)
}

/// Render seconds since service start as `HH:MM:SS`, hours may exceed 23
pub fn format_time(seconds: u32) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / HOUR,
        seconds % HOUR / MINUTE,
        seconds % MINUTE
    )
}

/// ASCII digits only, no sign or whitespace
fn digits(field: &str) -> Option<u32> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_hhmm() {
        assert_eq!(parse_time("00:00", 0).unwrap(), 0);
        assert_eq!(parse_time("05:30", 0).unwrap(), 19_800);
        assert_eq!(parse_time("23:59", 0).unwrap(), 86_340);
    }

    #[test]
    fn test_parse_hhmmss() {
        assert_eq!(parse_time("05:30:15", 0).unwrap(), 19_815);
    }

    #[test]
    fn test_day_offset() {
        assert_eq!(parse_time("05:30", 1).unwrap(), 19_800 + DAY);
        assert_eq!(parse_time("00:10", 2).unwrap(), 2 * DAY + 600);
    }

    #[test]
    fn test_hours_past_midnight_are_allowed() {
        assert_eq!(parse_time("25:00", 0).unwrap(), 25 * HOUR);
        assert_eq!(parse_time("100:00", 0).unwrap(), 100 * HOUR);
    }

    #[test]
    fn test_invalid_shapes() {
        for bad in [
            "5:3", "5:30", "05:3", "05", "", ":", "05:30:", "05:30:1", "05:30:15:00", "ab:cd",
            "05:3a", "+5:30", " 05:30", "05:30 ", "-1:30",
        ] {
            assert!(
                matches!(parse_time(bad, 0), Err(IngestError::InvalidTimeFormat { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_overflow_is_invalid() {
        assert!(parse_time("05:30", u32::MAX).is_err());
        assert!(parse_time("99999999999:00", 0).is_err());
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(19_815), "05:30:15");
        assert_eq!(format_time(DAY + 40 * MINUTE), "24:40:00");
    }

    proptest! {
        /// Every well-formed time decodes and renders back to itself
        #[test]
        fn parse_format_roundtrip(hour in 0u32..48, minute in 0u32..60, second in 0u32..60, day in 0u32..4) {
            let text = format!("{hour:02}:{minute:02}:{second:02}");
            let seconds = parse_time(&text, day).unwrap();
            prop_assert_eq!(seconds, (hour + 24 * day) * HOUR + minute * MINUTE + second);
            prop_assert_eq!(format_time(seconds), format!("{:02}:{minute:02}:{second:02}", hour + 24 * day));
        }

        /// A later day offset always lands exactly one day later
        #[test]
        fn day_offset_adds_whole_days(hour in 0u32..24, minute in 0u32..60, day in 0u32..10) {
            let text = format!("{hour:02}:{minute:02}");
            prop_assert_eq!(parse_time(&text, day + 1).unwrap() - parse_time(&text, day).unwrap(), DAY);
        }
    }
}
