/// Errors that abort parsing of a capture file.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// Both or neither of the direction markers are present.
    #[error("ambiguous direction at line {line} (offset {offset}): {excerpt}")]
    AmbiguousDirection {
        line: usize,
        offset: usize,
        excerpt: String,
    },

    /// The declared payload length disagrees with the hex dump.
    #[error(
        "payload length mismatch at line {line} (offset {offset}): declared {declared}, dump holds {decoded}: {excerpt}"
    )]
    IntegrityMismatch {
        line: usize,
        offset: usize,
        declared: usize,
        decoded: usize,
        excerpt: String,
    },

    /// A hex dump token is not a hex byte.
    #[error("invalid hex token {token:?} at line {line} (offset {offset})")]
    InvalidHex {
        line: usize,
        offset: usize,
        token: String,
    },

    /// The block timestamp could not be parsed.
    #[error("invalid timestamp {text:?} at line {line} (offset {offset}): {source}")]
    InvalidTimestamp {
        line: usize,
        offset: usize,
        text: String,
        source: chrono::ParseError,
    },

    /// The declared payload length does not fit in memory.
    #[error("invalid payload length {text:?} at line {line} (offset {offset})")]
    InvalidLength {
        line: usize,
        offset: usize,
        text: String,
    },
}

impl CaptureError {
    /// Byte offset of the offending block within the capture text.
    pub fn offset(&self) -> usize {
        match self {
            CaptureError::AmbiguousDirection { offset, .. }
            | CaptureError::IntegrityMismatch { offset, .. }
            | CaptureError::InvalidHex { offset, .. }
            | CaptureError::InvalidTimestamp { offset, .. }
            | CaptureError::InvalidLength { offset, .. } => *offset,
        }
    }

    /// 1-based line number of the offending block.
    pub fn line(&self) -> usize {
        match self {
            CaptureError::AmbiguousDirection { line, .. }
            | CaptureError::IntegrityMismatch { line, .. }
            | CaptureError::InvalidHex { line, .. }
            | CaptureError::InvalidTimestamp { line, .. }
            | CaptureError::InvalidLength { line, .. } => *line,
        }
    }
}

pub type Result<T> = std::result::Result<T, CaptureError>;
