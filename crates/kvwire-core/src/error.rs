//! Error types for kvwire-core

use thiserror::Error;

/// Result type alias for kvwire-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while encoding or decoding RESP frames.
///
/// An *incomplete* frame is not an error: the decoder signals it with
/// `Ok(None)` so the caller can read more bytes and retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// A frame began with a byte that is not a RESP type marker.
    #[error("invalid reply type prefix: 0x{0:02x}")]
    InvalidPrefix(u8),

    /// A header line ended with a bare LF instead of CRLF.
    #[error("malformed line terminator (expected CRLF)")]
    BadLineTerminator,

    /// A length or integer header did not parse as a decimal number.
    #[error("malformed integer in frame header: {0:?}")]
    BadInteger(String),

    /// A bulk string declared a length above the decoder limit.
    #[error("bulk string length {0} exceeds limit")]
    BulkTooLarge(i64),

    /// An array declared an element count above the decoder limit.
    #[error("array length {0} exceeds limit")]
    ArrayTooLarge(i64),

    /// Arrays nested deeper than the decoder allows.
    #[error("reply nesting exceeds maximum depth")]
    DepthExceeded,

    /// A command was built with no name.
    #[error("command has no name")]
    EmptyCommand,

    /// A reply value could not convert to the requested Rust type.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// What the conversion wanted.
        expected: &'static str,
        /// What the wire actually carried.
        actual: &'static str,
    },

    /// A reply payload was expected to be UTF-8 but was not.
    #[error("reply payload is not valid UTF-8")]
    NotUtf8,
}
