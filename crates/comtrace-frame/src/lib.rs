//! Incremental decoder for the serial-line command protocol.
//!
//! Every frame on the wire starts with a `0xFF` preamble followed by one of:
//! - `0x06` (ACK) or `0x15` (NAK): a complete single-byte frame
//! - `0x02` (STX), an opcode, then either
//!   - legacy framing: payload bytes with DLE (`0x10`) escapes, closed by ETX (`0x03`)
//!   - length-prefixed framing: a length byte, that many payload bytes,
//!     a 2-byte checksum and ETX
//!
//! Bytes can be fed in arbitrary chunks. The decoder suspends when it runs
//! out of input and resumes on the next feed, and it can resynchronize on
//! corrupted input without dropping good frames.

pub mod codec;
pub mod decoder;
pub mod error;

pub use codec::{
    is_legacy_opcode, Frame, Phase, ACK, CHECKSUM_SIZE, DLE, ETX, NAK, PREAMBLE, STX,
};
pub use decoder::{Drain, FrameDecoder};
pub use error::{DecodeError, Result};
