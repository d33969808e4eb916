// Streaming route block reader
//
// The schedule feed is one JSON document holding tens of thousands of route
// blocks. FeedReader walks it with a single forward cursor: structural bytes
// (`[`, `,`, `]`, the envelope object) are handled here, and each element is
// handed to serde_json straight from the same cursor. Only the block being
// decoded is ever in memory.

use crate::error::{IngestError, Result};
use crate::feed::models::RouteBlock;
use serde::de::{DeserializeOwned, IgnoredAny};
use std::io::{self, BufRead};
use std::iter::FusedIterator;
use tracing::{debug, trace};

/// Envelope member holding the route block array
pub const ROUTES_MEMBER: &str = "rt";

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Just past `[`
    First,
    /// Just past a route block
    Rest,
    /// Past `]` or after an error
    Done,
}

/// Lazy, forward-only sequence of route blocks.
///
/// Accepts a bare top-level array of route blocks or the publisher's envelope
/// (`{"rt": [...], ...}`). Members of the envelope other than `rt` are skipped
/// without being materialized. Once the array is closed or an error was
/// returned, the reader yields `None` forever; re-reading the feed means
/// opening the source again.
pub struct FeedReader<R> {
    reader: R,
    state: State,
    index: usize,
}

impl<R: BufRead> FeedReader<R> {
    /// Position the cursor at the first route block.
    ///
    /// Fails with `MalformedFeed` when the document does not start with a
    /// route block array or an envelope containing one.
    pub fn new(reader: R) -> Result<Self> {
        let mut feed = Self {
            reader,
            state: State::First,
            index: 0,
        };
        feed.enter_array()?;
        Ok(feed)
    }

    /// Number of route blocks decoded so far
    pub fn blocks_read(&self) -> usize {
        self.index
    }

    fn enter_array(&mut self) -> Result<()> {
        self.skip_bom()?;
        self.skip_whitespace()?;
        match self.peek()? {
            Some(b'[') => {
                self.reader.consume(1);
                debug!("Feed is a bare route block array");
                Ok(())
            },
            Some(b'{') => {
                self.reader.consume(1);
                self.seek_routes_member()
            },
            other => Err(self.unexpected(other, "a route block array or a feed object")),
        }
    }

    /// Skip envelope members until `rt` and step into its array
    fn seek_routes_member(&mut self) -> Result<()> {
        loop {
            self.skip_whitespace()?;
            match self.peek()? {
                Some(b'"') => {},
                Some(b'}') => return Err(self.missing_routes_member()),
                other => return Err(self.unexpected(other, "a member name")),
            }

            let key: String = self.decode("member name")?;
            self.expect_byte(b':', "`:`")?;

            if key == ROUTES_MEMBER {
                debug!(member = ROUTES_MEMBER, "Found route block array in feed object");
                return self.expect_byte(b'[', "a route block array");
            }

            trace!(member = %key, "Skipping feed member");
            self.skip_value()?;
            self.skip_whitespace()?;
            match self.next_byte()? {
                Some(b',') => {},
                Some(b'}') => return Err(self.missing_routes_member()),
                other => return Err(self.unexpected(other, "`,` or `}`")),
            }
        }
    }

    fn skip_value(&mut self) -> Result<()> {
        self.skip_whitespace()?;
        match self.peek()? {
            // serde_json peeks one byte past a number and would swallow the separator
            Some(b'-' | b'0'..=b'9') => {
                while let Some(b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E') = self.peek()? {
                    self.reader.consume(1);
                }
                Ok(())
            },
            _ => self.decode::<IgnoredAny>("feed member").map(drop),
        }
    }

    fn advance(&mut self) -> Result<Option<RouteBlock>> {
        if self.state == State::Done {
            return Ok(None);
        }

        self.skip_whitespace()?;
        match self.state {
            State::First => {
                if self.peek()? == Some(b']') {
                    self.reader.consume(1);
                    self.state = State::Done;
                    return Ok(None);
                }
            },
            State::Rest => match self.next_byte()? {
                Some(b',') => {},
                Some(b']') => {
                    self.state = State::Done;
                    return Ok(None);
                },
                other => return Err(self.unexpected(other, "`,` or `]` after a route block")),
            },
            State::Done => return Ok(None),
        }

        let block: RouteBlock = self.decode("route block")?;
        self.state = State::Rest;
        self.index += 1;
        Ok(Some(block))
    }

    /// Decode one JSON value directly from the cursor
    fn decode<T: DeserializeOwned>(&mut self, what: &str) -> Result<T> {
        let index = self.index;
        let mut de = serde_json::Deserializer::from_reader(&mut self.reader);
        T::deserialize(&mut de).map_err(|e| {
            if e.is_io() {
                read_error(index, io::Error::from(e))
            } else {
                IngestError::malformed(index, format!("invalid {what}: {e}"))
            }
        })
    }

    fn peek(&mut self) -> Result<Option<u8>> {
        loop {
            match self.reader.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(read_error(self.index, e)),
            }
        }
    }

    fn next_byte(&mut self) -> Result<Option<u8>> {
        let byte = self.peek()?;
        if byte.is_some() {
            self.reader.consume(1);
        }
        Ok(byte)
    }

    fn expect_byte(&mut self, expected: u8, what: &str) -> Result<()> {
        self.skip_whitespace()?;
        match self.next_byte()? {
            Some(b) if b == expected => Ok(()),
            other => Err(self.unexpected(other, what)),
        }
    }

    fn skip_whitespace(&mut self) -> Result<()> {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek()? {
            self.reader.consume(1);
        }
        Ok(())
    }

    fn skip_bom(&mut self) -> Result<()> {
        if self.peek()? != Some(UTF8_BOM[0]) {
            return Ok(());
        }
        for expected in UTF8_BOM {
            if self.next_byte()? != Some(expected) {
                return Err(IngestError::malformed(self.index, "truncated byte order mark"));
            }
        }
        Ok(())
    }

    fn unexpected(&self, found: Option<u8>, expected: &str) -> IngestError {
        let found = match found {
            Some(b) if b.is_ascii_graphic() => format!("`{}`", b as char),
            Some(b) => format!("byte 0x{b:02x}"),
            None => "end of input".to_string(),
        };
        IngestError::malformed(self.index, format!("expected {expected}, found {found}"))
    }

    fn missing_routes_member(&self) -> IngestError {
        IngestError::malformed(
            self.index,
            format!("feed object has no `{ROUTES_MEMBER}` member"),
        )
    }
}

/// Corrupt bytes under the document (a broken gzip stream, say) are a feed
/// problem at the current block; anything else stays an I/O failure
fn read_error(index: usize, e: io::Error) -> IngestError {
    match e.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput => {
            IngestError::malformed(index, format!("unreadable feed data: {e}"))
        },
        _ => IngestError::Io(e),
    }
}

impl<R: BufRead> Iterator for FeedReader<R> {
    type Item = Result<RouteBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.advance() {
            Ok(block) => block.map(Ok),
            Err(e) => {
                self.state = State::Done;
                Some(Err(e))
            },
        }
    }
}

impl<R: BufRead> FusedIterator for FeedReader<R> {}
