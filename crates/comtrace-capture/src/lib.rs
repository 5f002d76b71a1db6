//! Parser for the text logs written by the serial-line monitor.
//!
//! Each `MSG_LINE_DATA` block of a capture becomes one [`TraceEntry`]: a
//! timestamp, the directed link the bytes travelled on, and the bytes
//! themselves recovered from the block's hex dump.

pub mod config;
pub mod entry;
pub mod error;
pub mod traffic;

pub use config::CaptureConfig;
pub use entry::{parse_all, parse_entries, TraceEntries, TraceEntry};
pub use error::{CaptureError, Result};
pub use traffic::{coalesce_traffic, TrafficBursts};
