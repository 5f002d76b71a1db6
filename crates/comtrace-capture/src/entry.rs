use std::sync::LazyLock;

use bytes::Bytes;
use chrono::NaiveDateTime;
use regex::{CaptureMatches, Captures, Regex};

use crate::config::CaptureConfig;
use crate::error::{CaptureError, Result};

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.f";

/// Characters of a block quoted in error messages.
const EXCERPT_CHARS: usize = 48;

/// One `MSG_LINE_DATA` block:
///
/// ```text
/// 2016/05/01 10:00:00.000 PC<-(trace)-RTU: MSG_LINE_DATA {[4]:
///   FF 02 06 03                                    ....
/// }
/// ```
///
/// `<` on the left or `>` on the right marks the receiving node.
static ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?ms)^(?P<time>\d{4}/[01]\d/[0-3]\d [0-2]\d:[0-5]\d:[0-5]\d\.\d+) ",
        r"(?P<first>[^\r\n]+?)(?P<left><?)-\(trace\)-(?P<right>>?)(?P<second>[^\r\n]*?): ",
        r"MSG_LINE_DATA\s\{\[(?P<len>\d+)\]:(?P<dump>.*?)\}$",
    ))
    .expect("capture entry pattern is valid")
});

/// Bytes observed on one directed link at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    pub time: NaiveDateTime,
    pub source: String,
    pub dest: String,
    pub payload: Bytes,
}

impl TraceEntry {
    pub fn new(
        time: NaiveDateTime,
        source: impl Into<String>,
        dest: impl Into<String>,
        payload: impl Into<Bytes>,
    ) -> Self {
        Self {
            time,
            source: source.into(),
            dest: dest.into(),
            payload: payload.into(),
        }
    }
}

/// Iterator over the entries of one capture text, in block order.
///
/// Yields at most one error; iteration ends after it.
pub struct TraceEntries<'t> {
    text: &'t str,
    matches: CaptureMatches<'static, 't>,
    config: CaptureConfig,
    /// Byte offset and line number of the last block start.
    cursor: (usize, usize),
    failed: bool,
}

impl<'t> TraceEntries<'t> {
    pub fn with_config(text: &'t str, config: CaptureConfig) -> Self {
        Self {
            text,
            matches: ENTRY_RE.captures_iter(text),
            config,
            cursor: (0, 1),
            failed: false,
        }
    }

    /// Line number of `offset`, counting only the text since the last block.
    fn line_at(&mut self, offset: usize) -> usize {
        let (last_offset, last_line) = self.cursor;
        let line = last_line + self.text[last_offset..offset].matches('\n').count();
        self.cursor = (offset, line);
        line
    }
}

impl Iterator for TraceEntries<'_> {
    type Item = Result<TraceEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let caps = self.matches.next()?;
        let line = self.line_at(caps.get(0).map_or(0, |m| m.start()));
        let entry = parse_block(&caps, line, &self.config);
        if let Err(err) = &entry {
            tracing::debug!(offset = err.offset(), "capture block rejected: {err}");
            self.failed = true;
        }
        Some(entry)
    }
}

/// Parse a capture text with the default dump geometry.
pub fn parse_entries(text: &str) -> TraceEntries<'_> {
    TraceEntries::with_config(text, CaptureConfig::default())
}

/// Parse a whole capture text, failing on the first malformed block.
pub fn parse_all(text: &str) -> Result<Vec<TraceEntry>> {
    parse_entries(text).collect()
}

struct BlockContext {
    line: usize,
    offset: usize,
    excerpt: String,
}

fn parse_block(caps: &Captures<'_>, line: usize, config: &CaptureConfig) -> Result<TraceEntry> {
    let whole = &caps[0];
    let offset = caps.get(0).map_or(0, |m| m.start());
    let ctx = BlockContext {
        line,
        offset,
        excerpt: whole.chars().take(EXCERPT_CHARS).collect(),
    };

    let time_text = &caps["time"];
    let time = NaiveDateTime::parse_from_str(time_text, TIMESTAMP_FORMAT).map_err(|source| {
        CaptureError::InvalidTimestamp {
            line: ctx.line,
            offset: ctx.offset,
            text: time_text.to_string(),
            source,
        }
    })?;

    let first = &caps["first"];
    let second = &caps["second"];
    let (source, dest) = match (caps["left"].is_empty(), caps["right"].is_empty()) {
        (false, true) => (second, first),
        (true, false) => (first, second),
        _ => {
            return Err(CaptureError::AmbiguousDirection {
                line: ctx.line,
                offset: ctx.offset,
                excerpt: ctx.excerpt,
            })
        }
    };

    let declared: usize = caps["len"]
        .parse()
        .map_err(|_| CaptureError::InvalidLength {
            line: ctx.line,
            offset: ctx.offset,
            text: caps["len"].to_string(),
        })?;

    let payload = decode_dump(&caps["dump"], config, &ctx)?;
    if payload.len() != declared {
        return Err(CaptureError::IntegrityMismatch {
            line: ctx.line,
            offset: ctx.offset,
            declared,
            decoded: payload.len(),
            excerpt: ctx.excerpt,
        });
    }

    Ok(TraceEntry::new(time, source, dest, payload))
}

/// Join the hex fields of all dump rows and read them as `"XX "` tokens.
fn decode_dump(dump: &str, config: &CaptureConfig, ctx: &BlockContext) -> Result<Vec<u8>> {
    let chars: Vec<char> = dump.chars().collect();
    let hex_text = chars
        .chunks(config.row_width.max(1))
        .map(|row| hex_field(row, config))
        .collect::<Vec<_>>()
        .join(" ");

    let hex_chars: Vec<char> = hex_text.chars().collect();
    hex_chars
        .chunks(3)
        .map(|token| {
            let digits: String = token.iter().take(2).collect();
            u8::from_str_radix(digits.trim(), 16).map_err(|_| CaptureError::InvalidHex {
                line: ctx.line,
                offset: ctx.offset,
                token: token.iter().collect(),
            })
        })
        .collect()
}

fn hex_field(row: &[char], config: &CaptureConfig) -> String {
    let end = config.hex_end.min(row.len());
    let start = config.hex_start.min(end);
    let field: String = row[start..end].iter().collect();
    field.trim_end().to_string()
}
