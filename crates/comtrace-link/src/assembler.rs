use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use bytes::Bytes;
use comtrace_capture::TraceEntry;
use comtrace_frame::FrameDecoder;

use crate::config::AssemblerConfig;
use crate::link::{Backlog, LinkKey, LinkReport, LinkStats};
use crate::record::{hex_string, GarbageSpan, OutputRecord};

/// Garbage bytes shown in resync log lines.
const GARBAGE_PREVIEW_BYTES: usize = 16;

#[derive(Debug, Default)]
struct Link {
    decoder: FrameDecoder,
    backlog: Backlog,
    stats: LinkStats,
}

/// Routes trace entries to per-link decoders and times the decoded frames.
///
/// Links are created on first use and live as long as the assembler, so a
/// frame may span capture entries from consecutive files.
#[derive(Debug, Default)]
pub struct Assembler {
    links: BTreeMap<LinkKey, Link>,
    garbage: Vec<GarbageSpan>,
    config: AssemblerConfig,
}

impl Assembler {
    /// Create an assembler with default configuration.
    pub fn new() -> Self {
        Self::with_config(AssemblerConfig::default())
    }

    /// Create an assembler with explicit configuration.
    pub fn with_config(config: AssemblerConfig) -> Self {
        Self {
            links: BTreeMap::new(),
            garbage: Vec::new(),
            config,
        }
    }

    /// Feed one trace entry and return the frames it completed.
    pub fn ingest(&mut self, entry: TraceEntry) -> Vec<OutputRecord> {
        let mut records = Vec::new();
        self.ingest_into(entry, &mut records);
        records
    }

    /// Like [`ingest`](Self::ingest), appending to `out`. Returns the number
    /// of records appended.
    pub fn ingest_into(&mut self, entry: TraceEntry, out: &mut Vec<OutputRecord>) -> usize {
        let TraceEntry {
            time,
            source,
            dest,
            payload,
        } = entry;

        let link = match self.links.entry(LinkKey::new(source.as_str(), dest.as_str())) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => {
                tracing::debug!(%source, %dest, "new link");
                vacant.insert(Link::default())
            }
        };

        link.stats.entries += 1;
        link.stats.bytes_in += payload.len();
        link.decoder.feed(&payload);
        link.backlog.push(time, payload);

        let before = out.len();
        loop {
            match link.decoder.decode_next() {
                Ok(Some(frame)) => {
                    let (start, end) = link.backlog.window().unwrap_or((time, time));
                    tracing::debug!(
                        %source,
                        %dest,
                        opcode = frame.opcode,
                        wire_size = frame.wire_size(),
                        "frame"
                    );
                    out.push(OutputRecord {
                        start,
                        end,
                        source: source.clone(),
                        dest: dest.clone(),
                        raw: frame.raw,
                    });
                    link.stats.frames += 1;
                    link.backlog.retire(link.decoder.pending_len());
                }
                Ok(None) => break,
                Err(err) => {
                    let discarded = link.decoder.clean();
                    tracing::warn!(
                        %source,
                        %dest,
                        %time,
                        discarded = discarded.len(),
                        preview = %hex_string(&discarded[..discarded.len().min(GARBAGE_PREVIEW_BYTES)]),
                        "resynchronized after {err}"
                    );
                    link.stats.resyncs += 1;
                    link.stats.garbage_bytes += discarded.len();
                    link.backlog.discard(discarded.len());

                    // A failed attempt always starts at INIT, so clean drops at
                    // least its first byte.
                    if discarded.is_empty() {
                        break;
                    }
                    if self.config.keep_garbage {
                        self.garbage.push(GarbageSpan {
                            source: source.clone(),
                            dest: dest.clone(),
                            time,
                            bytes: Bytes::from(discarded),
                        });
                    }
                }
            }
        }
        out.len() - before
    }

    /// Take the garbage spans collected so far.
    pub fn take_garbage(&mut self) -> Vec<GarbageSpan> {
        std::mem::take(&mut self.garbage)
    }

    /// Counters of a single link, if it has been seen.
    pub fn stats(&self, key: &LinkKey) -> Option<LinkStats> {
        self.links.get(key).map(|link| link.stats)
    }

    /// One report per link, ordered by link.
    pub fn report(&self) -> Vec<LinkReport> {
        self.links
            .iter()
            .map(|(key, link)| LinkReport {
                key: key.clone(),
                stats: link.stats,
                buffered: link.decoder.pending_len() + link.decoder.partial_len(),
            })
            .collect()
    }

    /// Number of links seen.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Capture entries currently held for the link's unfinished frame.
    pub fn backlog_len(&self, key: &LinkKey) -> usize {
        self.links.get(key).map_or(0, |link| link.backlog.len())
    }
}
