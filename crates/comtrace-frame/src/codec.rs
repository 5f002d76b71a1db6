use std::fmt;

use bytes::Bytes;

use crate::error::{DecodeError, Result};

/// Preamble byte that opens every frame.
pub const PREAMBLE: u8 = 0xFF;

/// Start of a command frame.
pub const STX: u8 = 0x02;

/// End of a command frame.
pub const ETX: u8 = 0x03;

/// Positive acknowledge (complete frame on its own).
pub const ACK: u8 = 0x06;

/// Data link escape, legacy framing only.
pub const DLE: u8 = 0x10;

/// Negative acknowledge (complete frame on its own).
pub const NAK: u8 = 0x15;

/// Trailing checksum size of length-prefixed frames. Consumed, never verified.
pub const CHECKSUM_SIZE: usize = 2;

/// Highest control-range byte value.
const CONTROL_MAX: u8 = 0x1F;

/// Opcode outside the control range that still uses legacy framing.
const LEGACY_EXTENDED_OPCODE: u8 = 0xC4;

/// Returns true if frames with this opcode use escape-terminated framing.
pub fn is_legacy_opcode(opcode: u8) -> bool {
    opcode <= CONTROL_MAX || opcode == LEGACY_EXTENDED_OPCODE
}

/// A decoded frame together with the exact bytes it occupied on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command opcode. ACK/NAK frames carry the acknowledge byte here.
    pub opcode: u8,
    /// Unescaped payload.
    pub payload: Bytes,
    /// Raw stream bytes, including preamble, escapes, length, checksum and ETX.
    pub raw: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(opcode: u8, payload: impl Into<Bytes>, raw: impl Into<Bytes>) -> Self {
        Self {
            opcode,
            payload: payload.into(),
            raw: raw.into(),
        }
    }

    /// Number of stream bytes this frame consumed.
    pub fn wire_size(&self) -> usize {
        self.raw.len()
    }
}

/// Decoder automaton phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Waiting for the preamble.
    #[default]
    Init,
    /// Preamble seen, waiting for ACK/NAK/STX.
    Pro,
    /// Waiting for the opcode.
    Cmd,
    /// Collecting legacy payload until ETX.
    LegacyData,
    /// DLE seen, waiting for the escaped byte.
    Escape,
    /// Waiting for the payload length byte.
    Len,
    /// Collecting a length-prefixed payload.
    Data,
    /// Collecting the checksum.
    Crc,
    /// Waiting for the closing ETX.
    EtxWait,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Init => "INIT",
            Phase::Pro => "PRO",
            Phase::Cmd => "CMD",
            Phase::LegacyData => "LEGACYDATA",
            Phase::Escape => "ESCAPE",
            Phase::Len => "LEN",
            Phase::Data => "DATA",
            Phase::Crc => "CRC",
            Phase::EtxWait => "ETX-WAIT",
        };
        f.write_str(name)
    }
}

/// Outcome of feeding one byte to the automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Pending,
    Complete,
}

/// In-progress frame: automaton phase plus everything accumulated so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FrameState {
    phase: Phase,
    opcode: u8,
    declared_len: usize,
    payload: Vec<u8>,
    checksum: Vec<u8>,
    span: Vec<u8>,
}

impl FrameState {
    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    /// Bytes consumed by the frame attempt so far.
    pub(crate) fn span_len(&self) -> usize {
        self.span.len()
    }

    /// Advance the automaton by one byte.
    ///
    /// The byte is recorded in the span before the transition, so a failed
    /// attempt can hand back everything it consumed, trigger included.
    pub(crate) fn advance(&mut self, byte: u8) -> Result<Step> {
        self.span.push(byte);
        let invalid = DecodeError::InvalidByte {
            byte,
            phase: self.phase,
        };

        match self.phase {
            Phase::Init => {
                if byte != PREAMBLE {
                    return Err(invalid);
                }
                self.phase = Phase::Pro;
            }
            Phase::Pro => match byte {
                ACK | NAK => {
                    self.opcode = byte;
                    return Ok(Step::Complete);
                }
                STX => self.phase = Phase::Cmd,
                _ => return Err(invalid),
            },
            Phase::Cmd => {
                self.opcode = byte;
                self.phase = if is_legacy_opcode(byte) {
                    Phase::LegacyData
                } else {
                    Phase::Len
                };
            }
            Phase::LegacyData => match byte {
                DLE => self.phase = Phase::Escape,
                ETX => return Ok(Step::Complete),
                _ => self.payload.push(byte),
            },
            Phase::Escape => {
                if byte > CONTROL_MAX {
                    return Err(invalid);
                }
                self.payload.push(byte);
                self.phase = Phase::LegacyData;
            }
            Phase::Len => {
                self.declared_len = usize::from(byte);
                self.phase = if self.declared_len == 0 {
                    Phase::Crc
                } else {
                    Phase::Data
                };
            }
            Phase::Data => {
                self.payload.push(byte);
                if self.payload.len() == self.declared_len {
                    self.phase = Phase::Crc;
                }
            }
            Phase::Crc => {
                self.checksum.push(byte);
                if self.checksum.len() == CHECKSUM_SIZE {
                    self.phase = Phase::EtxWait;
                }
            }
            Phase::EtxWait => {
                if byte != ETX {
                    return Err(invalid);
                }
                return Ok(Step::Complete);
            }
        }

        Ok(Step::Pending)
    }

    /// Take the completed frame and reset to INIT.
    pub(crate) fn finish(&mut self) -> Frame {
        let state = std::mem::take(self);
        Frame {
            opcode: state.opcode,
            payload: Bytes::from(state.payload),
            raw: Bytes::from(state.span),
        }
    }

    /// Abandon the attempt, returning its consumed bytes, and reset to INIT.
    pub(crate) fn abandon(&mut self) -> Vec<u8> {
        std::mem::take(self).span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(bytes: &[u8]) -> (FrameState, Vec<Result<Step>>) {
        let mut state = FrameState::default();
        let steps = bytes.iter().map(|&b| state.advance(b)).collect();
        (state, steps)
    }

    #[test]
    fn legacy_opcode_ranges() {
        assert!(is_legacy_opcode(0x00));
        assert!(is_legacy_opcode(0x1F));
        assert!(is_legacy_opcode(0xC4));
        assert!(!is_legacy_opcode(0x20));
        assert!(!is_legacy_opcode(0xC3));
        assert!(!is_legacy_opcode(0xFF));
    }

    #[test]
    fn phase_walk_for_length_prefixed_frame() {
        let mut state = FrameState::default();
        let expected = [
            (0xFF, Phase::Pro),
            (0x02, Phase::Cmd),
            (0x41, Phase::Len),
            (0x01, Phase::Data),
            (0x99, Phase::Crc),
            (0x12, Phase::Crc),
            (0x34, Phase::EtxWait),
        ];
        for (byte, phase) in expected {
            assert_eq!(state.advance(byte), Ok(Step::Pending));
            assert_eq!(state.phase(), phase);
        }
        assert_eq!(state.advance(ETX), Ok(Step::Complete));

        let frame = state.finish();
        assert_eq!(frame.opcode, 0x41);
        assert_eq!(frame.payload.as_ref(), &[0x99]);
        assert_eq!(state, FrameState::default());
    }

    #[test]
    fn zero_length_goes_straight_to_checksum() {
        let (state, steps) = run(&[0xFF, 0x02, 0x50, 0x00]);
        assert!(steps.iter().all(|s| *s == Ok(Step::Pending)));
        assert_eq!(state.phase(), Phase::Crc);
    }

    #[test]
    fn error_reports_phase_of_trigger() {
        let (_, steps) = run(&[0xFF, 0x7E]);
        assert_eq!(
            steps[1],
            Err(DecodeError::InvalidByte {
                byte: 0x7E,
                phase: Phase::Pro
            })
        );
    }

    #[test]
    fn abandon_returns_span_including_trigger() {
        let mut state = FrameState::default();
        state.advance(0xFF).unwrap();
        state.advance(0x02).unwrap();
        state.advance(0x01).unwrap();
        state.advance(DLE).unwrap();
        assert!(state.advance(0x25).is_err());

        assert_eq!(state.span_len(), 5);
        assert_eq!(state.abandon(), vec![0xFF, 0x02, 0x01, DLE, 0x25]);
        assert_eq!(state.phase(), Phase::Init);
    }

    #[test]
    fn acknowledge_frame_from_state() {
        let mut state = FrameState::default();
        assert_eq!(state.advance(PREAMBLE), Ok(Step::Pending));
        assert_eq!(state.advance(NAK), Ok(Step::Complete));

        let frame = state.finish();
        assert_eq!(frame, Frame::new(NAK, Bytes::new(), vec![PREAMBLE, NAK]));
        assert_eq!(frame.wire_size(), 2);
        assert_eq!(state.phase(), Phase::Init);
    }

    #[test]
    fn phase_display_names() {
        assert_eq!(Phase::LegacyData.to_string(), "LEGACYDATA");
        assert_eq!(Phase::EtxWait.to_string(), "ETX-WAIT");
    }
}
