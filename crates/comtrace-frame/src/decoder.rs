use std::collections::VecDeque;
use std::iter::FusedIterator;

use crate::codec::{Frame, FrameState, Phase, Step};
use crate::error::Result;

/// Incremental frame decoder for one directed link.
///
/// Bytes are queued with [`feed`](Self::feed) and decoded on demand. When the
/// queue runs dry mid-frame the partial frame stays in the decoder and
/// decoding picks up where it left off after the next feed.
///
/// On an invalid byte the bytes of the abandoned attempt go back to the front
/// of the queue untouched. Nothing is ever dropped except by
/// [`clean`](Self::clean), which hands the discarded bytes back to the caller.
#[derive(Debug, Clone, Default)]
pub struct FrameDecoder {
    state: FrameState,
    pending: VecDeque<u8>,
}

impl FrameDecoder {
    /// Create a decoder waiting for a preamble with an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes for decoding.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.pending.extend(bytes);
    }

    /// Decode the next frame.
    ///
    /// Returns `Ok(None)` when the queue is exhausted before a frame
    /// completes; the partial frame is kept for the next call.
    pub fn decode_next(&mut self) -> Result<Option<Frame>> {
        while let Some(byte) = self.pending.pop_front() {
            match self.state.advance(byte) {
                Ok(Step::Pending) => {}
                Ok(Step::Complete) => {
                    let frame = self.state.finish();
                    tracing::trace!(
                        opcode = frame.opcode,
                        payload_len = frame.payload.len(),
                        wire_size = frame.wire_size(),
                        "decoded frame"
                    );
                    return Ok(Some(frame));
                }
                Err(err) => {
                    self.rewind();
                    return Err(err);
                }
            }
        }
        Ok(None)
    }

    /// Iterate over frames until the queue runs dry or a byte is invalid.
    ///
    /// An invalid byte is yielded once as an error and ends the iteration.
    pub fn drain(&mut self) -> Drain<'_> {
        Drain {
            decoder: self,
            failed: false,
        }
    }

    /// Resynchronize by discarding leading bytes that cannot start a frame.
    ///
    /// Frame attempts are run from INIT over the queued bytes. Each failed
    /// attempt discards exactly one leading byte. Cleaning stops at the first
    /// complete frame (its bytes stay queued), at a viable but incomplete
    /// frame prefix (kept queued), or when the queue is empty. The automaton
    /// state in effect before the call is restored afterwards.
    ///
    /// Returns the discarded bytes in stream order.
    pub fn clean(&mut self) -> Vec<u8> {
        let saved = std::mem::take(&mut self.state);
        let mut garbage = Vec::new();

        loop {
            match self.decode_next() {
                Ok(Some(frame)) => {
                    self.unread(&frame.raw);
                    break;
                }
                Ok(None) => {
                    self.rewind();
                    break;
                }
                Err(_) => match self.pending.pop_front() {
                    Some(byte) => garbage.push(byte),
                    None => break,
                },
            }
        }

        self.state = saved;
        garbage
    }

    /// Current automaton phase.
    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    /// Number of queued bytes not yet consumed by the automaton.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// True if queued bytes are waiting to be decoded.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Number of bytes held by the frame currently being assembled.
    pub fn partial_len(&self) -> usize {
        self.state.span_len()
    }

    /// True when nothing is queued and no frame is in progress.
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.state.span_len() == 0
    }

    fn rewind(&mut self) {
        let span = self.state.abandon();
        self.unread(&span);
    }

    fn unread(&mut self, bytes: &[u8]) {
        for &byte in bytes.iter().rev() {
            self.pending.push_front(byte);
        }
    }
}

/// Iterator returned by [`FrameDecoder::drain`].
pub struct Drain<'a> {
    decoder: &'a mut FrameDecoder,
    failed: bool,
}

impl Iterator for Drain<'_> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.decoder.decode_next() {
            Ok(Some(frame)) => Some(Ok(frame)),
            Ok(None) => None,
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for Drain<'_> {}
