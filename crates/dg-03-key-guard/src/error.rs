//! Error types for the Key Guard subsystem

use thiserror::Error;

/// Key guard errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GuardError {
    /// The unvetting chunk size read from the contract is zero
    #[error("Max operators per unvetting must be positive")]
    InvalidChunkSize,

    /// Packed unvetting data could not be decoded
    #[error("Invalid packed encoding: {0}")]
    InvalidEncoding(String),

    /// The transaction gateway failed to sign or submit
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

/// Errors returned by a transaction gateway.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Submission failed: {0}")]
    Submission(String),
}

/// Result type for key guard operations
pub type GuardResult<T> = Result<T, GuardError>;

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;
