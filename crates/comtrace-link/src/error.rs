use std::path::PathBuf;

use comtrace_capture::CaptureError;

/// Errors that can occur while converting capture files.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The input path pattern is malformed.
    #[error("invalid input pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// The input path pattern matched no files.
    #[error("no capture files match {pattern}")]
    NoInputs { pattern: String },

    /// A capture file could not be read.
    #[error("failed reading {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A capture file is malformed. Processing of that file stopped here.
    #[error("{path}: {source}")]
    Capture {
        path: PathBuf,
        source: CaptureError,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
