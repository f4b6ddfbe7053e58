//! # Error Types
//!
//! Defines error types shared across subsystems.

use thiserror::Error;

/// Errors parsing fixed-width byte values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HexError {
    /// Input is not valid hexadecimal.
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Decoded value has the wrong width.
    #[error("Invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Error returned by an external read collaborator.
///
/// Adapters map their transport failures into this type; callers treat every
/// variant as transient and abort the current cycle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReadError {
    /// The remote service could not be reached or answered with an error.
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// The response could not be decoded.
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// The requested block is not known to the source.
    #[error("Block not found: {0}")]
    BlockNotFound(String),
}

/// Result alias for external reads.
pub type ReadResult<T> = Result<T, ReadError>;
