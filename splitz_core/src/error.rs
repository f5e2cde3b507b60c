//! Error types for encoding and decoding splitz streams.

use thiserror::Error;

/// Result type alias used throughout `splitz_core` and the bundled codecs.
pub type Result<T> = std::result::Result<T, Error>;

/// Every way a compress or decompress operation can fail.
///
/// All variants abort the current operation. End of stream is never an
/// error: the frame reader reports it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum Error {
    /// Open, read, or write failure on either side of the stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The entropy codec reported a failure while compressing a block.
    #[error("{codec} compression failed: {message}")]
    Compression {
        codec: &'static str,
        message: String,
    },

    /// The entropy codec rejected a payload, or it decoded to the wrong size.
    #[error("{codec} decompression failed: {message}")]
    Decompression {
        codec: &'static str,
        message: String,
    },

    /// The framed stream is truncated or its headers are inconsistent.
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    /// A [`StreamConfig`](crate::StreamConfig) value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Structural problems with block headers and payloads.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FramingError {
    /// The stream ended 1..=7 bytes into a block header.
    #[error("truncated block header: got {got} of 8 bytes")]
    TruncatedHeader { got: usize },

    /// The stream ended before `compressed_len` payload bytes were read.
    #[error("truncated block payload: expected {expected} bytes, got {got}")]
    TruncatedPayload { expected: u32, got: usize },

    /// A length does not fit in the header's u32 field.
    #[error("{field} of {len} bytes does not fit in a u32 length field")]
    LengthOverflow { field: &'static str, len: usize },

    /// The header claims more compressed bytes than the codec can ever emit
    /// for the declared original length.
    #[error("compressed_len {compressed_len} exceeds codec bound {bound}")]
    PayloadExceedsBound { compressed_len: usize, bound: usize },
}

impl Error {
    pub fn compression(codec: &'static str, message: impl Into<String>) -> Self {
        Error::Compression {
            codec,
            message: message.into(),
        }
    }

    pub fn decompression(codec: &'static str, message: impl Into<String>) -> Self {
        Error::Decompression {
            codec,
            message: message.into(),
        }
    }

    /// The framing failure behind this error, if that is what it is.
    pub fn as_framing(&self) -> Option<&FramingError> {
        match self {
            Error::Framing(f) => Some(f),
            _ => None,
        }
    }
}
