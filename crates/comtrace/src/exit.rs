use std::fmt;
use std::io;

use comtrace_link::PipelineError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

/// One-line usage text printed for argument-count errors and empty patterns.
pub const USAGE_LINE: &str = "USAGE: comtrace <logfile(s)> <outfile>";

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage() -> Self {
        Self::new(USAGE, USAGE_LINE)
    }

    /// True for the bare usage line, which goes to stdout.
    pub fn is_usage_line(&self) -> bool {
        self.code == USAGE && self.message == USAGE_LINE
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn pipeline_error(err: PipelineError) -> CliError {
    match err {
        PipelineError::NoInputs { .. } => CliError::usage(),
        PipelineError::Pattern(err) => CliError::new(USAGE, format!("invalid pattern: {err}")),
        PipelineError::Read { path, source } => {
            io_error(&format!("read {}", path.display()), source)
        }
        err @ PipelineError::Capture { .. } => CliError::new(DATA_INVALID, err.to_string()),
    }
}
