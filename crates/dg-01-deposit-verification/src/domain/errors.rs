//! # Validation Errors
//!
//! Error types for deposit signature validation.
//!
//! A bad signature is not an error: it is reported as an invalid key.

use thiserror::Error;

/// Errors that abort key validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The chain id has no known genesis fork version
    #[error("Unsupported chain id: {0}")]
    UnsupportedChain(u64),

    /// A verification worker died before returning its chunk
    #[error("Verification worker failed on chunk {chunk}")]
    WorkerFailure { chunk: usize },

    /// The worker pool could not be created
    #[error("Failed to build verification pool: {0}")]
    PoolInit(String),
}

/// Result alias for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;
