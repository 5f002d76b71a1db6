use std::fmt::Write;

use bytes::Bytes;
use chrono::NaiveDateTime;

/// Rendering of record timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// One decoded frame on one link, with the capture time window it spans.
///
/// Ordering follows field order: start, end, source, dest, raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OutputRecord {
    /// Timestamp of the earliest capture entry holding bytes of the frame.
    pub start: NaiveDateTime,
    /// Timestamp of the latest capture entry holding bytes of the frame.
    pub end: NaiveDateTime,
    pub source: String,
    pub dest: String,
    /// The frame exactly as it appeared in the stream.
    pub raw: Bytes,
}

impl OutputRecord {
    /// Raw frame bytes as space-separated uppercase hex.
    pub fn raw_hex(&self) -> String {
        hex_string(&self.raw)
    }
}

/// Bytes dropped while resynchronizing a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GarbageSpan {
    pub source: String,
    pub dest: String,
    /// Timestamp of the capture entry whose ingestion triggered the resync.
    pub time: NaiveDateTime,
    pub bytes: Bytes,
}

/// Render bytes as space-separated, two-digit uppercase hex.
pub fn hex_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{byte:02X}");
    }
    out
}
