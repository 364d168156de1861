//! Error types for the value codec.

use alloc::string::String;
use core::fmt;

/// Failure modes of the wire codec (PROTOCOL.md §1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The encoded form does not fit the caller's capacity.
    BufferTooSmall { needed: usize, cap: usize },
    /// The value cannot be represented on the wire.
    Unsupported(String),
    /// The byte stream is not a well-formed encoding.
    Malformed(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferTooSmall { needed, cap } => {
                write!(f, "encoded value needs {} bytes, capacity is {}", needed, cap)
            }
            Self::Unsupported(msg) => write!(f, "unsupported value: {}", msg),
            Self::Malformed(msg) => write!(f, "malformed encoding: {}", msg),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CodecError {}

/// Convenience result type for the codec.
pub type CodecResult<T> = core::result::Result<T, CodecError>;
