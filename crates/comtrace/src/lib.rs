//! Convert serial-line monitor captures into timed protocol frames.
//!
//! # Crate Structure
//!
//! - [`capture`] - Capture log parsing into trace entries
//! - [`frame`] - Incremental, resynchronizing frame decoder
//! - [`link`] - Per-link reassembly, frame timing and the file pipeline

/// Re-export capture types.
pub mod capture {
    pub use comtrace_capture::*;
}

/// Re-export frame types.
pub mod frame {
    pub use comtrace_frame::*;
}

/// Re-export link types.
pub mod link {
    pub use comtrace_link::*;
}
