//! Per-link stream reassembly for serial-line captures.
//!
//! Trace entries are routed to one decoder per directed link. Every decoded
//! frame comes out as an [`OutputRecord`] carrying the time window of the
//! capture entries its bytes arrived in.
//!
//! [`Pipeline`] drives the whole conversion over a sorted set of capture files.

pub mod assembler;
pub mod config;
pub mod error;
pub mod link;
pub mod pipeline;
pub mod record;

pub use assembler::Assembler;
pub use config::AssemblerConfig;
pub use error::{PipelineError, Result};
pub use link::{Backlog, LinkKey, LinkReport, LinkStats};
pub use pipeline::{
    collect_entries, load_capture, resolve_inputs, FileFailure, Pipeline, PipelineOutput,
};
pub use record::{hex_string, GarbageSpan, OutputRecord, TIMESTAMP_FORMAT};
