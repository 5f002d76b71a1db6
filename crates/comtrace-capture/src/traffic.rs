use bytes::BytesMut;
use chrono::TimeDelta;

use crate::entry::TraceEntry;

/// Merge consecutive entries on the same link into bursts.
///
/// An entry joins the current burst when it travels on the same link and its
/// timestamp is within `tolerance` of the burst's first entry. A burst keeps
/// the first entry's timestamp and the concatenated payloads.
pub fn coalesce_traffic<I>(entries: I, tolerance: TimeDelta) -> TrafficBursts<I::IntoIter>
where
    I: IntoIterator<Item = TraceEntry>,
{
    TrafficBursts {
        inner: entries.into_iter(),
        tolerance,
        burst: None,
    }
}

/// Iterator returned by [`coalesce_traffic`].
pub struct TrafficBursts<I> {
    inner: I,
    tolerance: TimeDelta,
    burst: Option<Burst>,
}

struct Burst {
    head: TraceEntry,
    payload: BytesMut,
}

impl Burst {
    fn start(entry: TraceEntry) -> Self {
        let payload = BytesMut::from(entry.payload.as_ref());
        Self {
            head: entry,
            payload,
        }
    }

    fn accepts(&self, entry: &TraceEntry, tolerance: TimeDelta) -> bool {
        entry.source == self.head.source
            && entry.dest == self.head.dest
            && entry.time - self.head.time <= tolerance
    }

    fn finish(self) -> TraceEntry {
        TraceEntry {
            payload: self.payload.freeze(),
            ..self.head
        }
    }
}

impl<I: Iterator<Item = TraceEntry>> Iterator for TrafficBursts<I> {
    type Item = TraceEntry;

    fn next(&mut self) -> Option<TraceEntry> {
        loop {
            let Some(entry) = self.inner.next() else {
                return self.burst.take().map(Burst::finish);
            };
            match self.burst.take() {
                Some(mut burst) if burst.accepts(&entry, self.tolerance) => {
                    burst.payload.extend_from_slice(&entry.payload);
                    self.burst = Some(burst);
                }
                Some(burst) => {
                    self.burst = Some(Burst::start(entry));
                    return Some(burst.finish());
                }
                None => self.burst = Some(Burst::start(entry)),
            }
        }
    }
}
