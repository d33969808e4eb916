// Schedule feed access
//
// The feed is a single JSON document published by the infrastructure manager.
// It is read strictly front to back: FeedReader never holds more than one
// route block, so the size of the feed does not matter.

pub mod models;
pub mod reader;

pub use models::{RouteBlock, RouteStop};
pub use reader::{FeedReader, ROUTES_MEMBER};

use crate::error::Result;
use chrono::NaiveDate;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

/// Open a feed file, gunzipping on the fly when the name ends in `.gz`
pub fn open_feed(path: &Path) -> Result<FeedReader<Box<dyn BufRead>>> {
    let file = File::open(path)?;
    let gzipped = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));

    info!(path = %path.display(), gzipped, "Opening schedule feed");

    let reader: Box<dyn BufRead> = if gzipped {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    FeedReader::new(reader)
}

/// Calendar date of an operating date entry such as `2026-01-05T00:00:00`
pub fn parse_operating_date(raw: &str) -> Option<NaiveDate> {
    let date = raw.get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const FEED: &str = r#"{"rt":[{"sid":7,"oid":1,"cc":"KS","nn":"4411","ccs":"OS",
        "od":["2026-03-01T00:00:00"],"st":[{"id":1,"ord":1,"atm":"06:00","dtm":"06:00"}]}]}"#;

    #[test]
    fn test_parse_operating_date() {
        let expected = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(parse_operating_date("2026-01-05T00:00:00+01:00"), Some(expected));
        assert_eq!(parse_operating_date("2026-01-05"), Some(expected));
        assert_eq!(parse_operating_date("2026-01"), None);
        assert_eq!(parse_operating_date("2026-13-05"), None);
        assert_eq!(parse_operating_date("yesterday!"), None);
    }

    #[test]
    fn test_open_plain_feed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedules.json");
        std::fs::write(&path, FEED).unwrap();

        let blocks: Vec<_> = open_feed(&path).unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].schedule_id, 7);
    }

    #[test]
    fn test_open_gzipped_feed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedules.json.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(FEED.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let blocks: Vec<_> = open_feed(&path).unwrap().collect::<Result<_>>().unwrap();
        assert_eq!(blocks[0].carrier_code, "KS");
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_feed(&dir.path().join("nope.json")).err().unwrap();
        assert!(matches!(err, crate::error::IngestError::Io(_)));
    }
}
