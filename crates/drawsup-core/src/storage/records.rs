//! Record segmentation of the backing file
//!
//! Splits the stream of raw lines into segments: an optional preamble (lines
//! before the first header) followed by one segment per header. A line that
//! starts with `[` but does not parse as a header is skipped: it stays in the
//! segment's raw lines so it is copied back unchanged, but it is not decoded,
//! and the lines after it keep belonging to the preceding record.

use tracing::warn;

use super::error::StoreResult;
use super::persistence::RawLines;
use crate::codec;
use crate::identity::{looks_like_header, parse_header, Identity};
use crate::models::RegionMap;

/// Header of a segment: parsed identity plus the line exactly as stored
pub(crate) type Head = (Identity, Vec<u8>);

/// A contiguous run of lines from the backing file
#[derive(Debug)]
pub(crate) struct Segment {
    /// `None` for the preamble
    pub head: Option<Head>,
    pub body: Vec<Vec<u8>>,
}

impl Segment {
    /// Decode the body lines into a region map
    ///
    /// Malformed header lines are left out and a trailing CR is dropped.
    pub fn regions(&self) -> RegionMap {
        let lines: Vec<String> = self
            .body
            .iter()
            .map(|line| String::from_utf8_lossy(line.strip_suffix(b"\r").unwrap_or(line)))
            .filter(|line| !looks_like_header(line))
            .map(|line| line.into_owned())
            .collect();

        let mut regions = RegionMap::new();
        codec::decode_lines(lines.iter().map(String::as_str), &mut regions);
        regions
    }
}

/// Lazy iterator over the segments of the backing file
///
/// The first item is always the (possibly empty) preamble.
pub(crate) struct Segments {
    lines: RawLines,
    pending: Option<Head>,
    line_no: usize,
    finished: bool,
}

impl Segments {
    pub fn new(lines: RawLines) -> Self {
        Self {
            lines,
            pending: None,
            line_no: 0,
            finished: false,
        }
    }
}

impl Iterator for Segments {
    type Item = StoreResult<Segment>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let head = self.pending.take();
        let mut body = Vec::new();

        loop {
            let line = match self.lines.next() {
                None => {
                    self.finished = true;
                    break;
                }
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(e));
                }
                Some(Ok(line)) => line,
            };
            self.line_no += 1;

            let text = String::from_utf8_lossy(&line);
            if let Some(identity) = parse_header(&text) {
                self.pending = Some((identity, line));
                break;
            }
            if looks_like_header(&text) {
                warn!(
                    line = self.line_no,
                    "Skipping malformed record header"
                );
            }
            body.push(line);
        }

        Some(Ok(Segment { head, body }))
    }
}
