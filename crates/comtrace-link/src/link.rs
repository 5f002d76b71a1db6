use std::collections::VecDeque;
use std::fmt;

use bytes::Bytes;
use chrono::NaiveDateTime;

/// A directed link between two capture nodes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkKey {
    pub source: String,
    pub dest: String,
}

impl LinkKey {
    pub fn new(source: impl Into<String>, dest: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
        }
    }
}

impl fmt::Display for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.dest)
    }
}

/// Capture entries of one link whose bytes may still belong to a frame
/// that has not completed yet.
///
/// The bytes held from `offset` into the oldest entry through the end of the
/// newest one are exactly the bytes the link's decoder has not yet turned
/// into a frame or thrown away.
#[derive(Debug, Clone, Default)]
pub struct Backlog {
    entries: VecDeque<(NaiveDateTime, Bytes)>,
    offset: usize,
}

impl Backlog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, time: NaiveDateTime, payload: Bytes) {
        self.entries.push_back((time, payload));
    }

    /// Timestamps of the oldest and newest entries.
    pub fn window(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let (first, _) = self.entries.front()?;
        let (last, _) = self.entries.back()?;
        Some((*first, *last))
    }

    /// Drop entries no longer needed after a frame completed.
    ///
    /// `bytes_remaining` is the number of bytes still undecoded. Only the
    /// newest entries holding those bytes are kept; with frames retired as
    /// they complete that is normally just the newest entry.
    pub fn retire(&mut self, bytes_remaining: usize) {
        let mut kept = 0;
        let mut keep_from = self.entries.len();
        while kept < bytes_remaining && keep_from > 0 {
            keep_from -= 1;
            kept += self.entries[keep_from].1.len();
        }
        self.entries.drain(..keep_from);
        self.offset = kept.saturating_sub(bytes_remaining);
    }

    /// Drop `count` leading bytes thrown away while resynchronizing, along
    /// with every entry they fully cover.
    pub fn discard(&mut self, mut count: usize) {
        while let Some((_, payload)) = self.entries.front() {
            let left = payload.len() - self.offset;
            if count < left {
                self.offset += count;
                return;
            }
            count -= left;
            self.entries.pop_front();
            self.offset = 0;
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Counters for one link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Capture entries ingested.
    pub entries: usize,
    /// Payload bytes ingested.
    pub bytes_in: usize,
    /// Frames decoded.
    pub frames: usize,
    /// Resynchronizations performed.
    pub resyncs: usize,
    /// Bytes discarded while resynchronizing.
    pub garbage_bytes: usize,
}

/// Snapshot of one link at the end of (or during) a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReport {
    pub key: LinkKey,
    pub stats: LinkStats,
    /// Bytes received but not yet part of a completed frame.
    pub buffered: usize,
}
