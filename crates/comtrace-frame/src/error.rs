use crate::codec::Phase;

/// Errors that can occur while decoding a byte stream into frames.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// A byte violated the framing grammar for the current phase.
    ///
    /// The bytes of the abandoned frame attempt are back in the decoder's
    /// buffer; call [`FrameDecoder::clean`](crate::FrameDecoder::clean) to
    /// skip past them.
    #[error("invalid byte 0x{byte:02X} in {phase} phase")]
    InvalidByte { byte: u8, phase: Phase },
}

pub type Result<T> = std::result::Result<T, DecodeError>;
