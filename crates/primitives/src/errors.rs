//! Errors raised while parsing or encoding primitive types.

use thiserror::Error;

/// Error while parsing a primitive from its textual representation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input is not valid hex.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// The decoded input does not have the expected length.
    #[error("expected {expected} bytes, got {got}")]
    InvalidLength {
        /// The expected number of bytes.
        expected: usize,
        /// The actual number of bytes.
        got: usize,
    },

    /// The input is not a valid unsigned 256-bit integer.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

/// Error while encoding or decoding a bridge instruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The payload is empty.
    #[error("empty payload")]
    Empty,

    /// The payload was produced by an incompatible encoder.
    #[error("unsupported instruction version: {0}")]
    UnsupportedVersion(u8),

    /// The payload could not be encoded.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The payload could not be decoded.
    #[error("decoding error: {0}")]
    Decoding(String),
}

/// The result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
