//! Error types for the guardian runtime

use crate::config::ConfigError;
use dg_01_deposit_verification::ValidationError;
use dg_02_block_snapshot::SnapshotError;
use dg_03_key_guard::GuardError;
use thiserror::Error;

/// Guardian runtime errors.
///
/// `UnsupportedChain` and `VersionMismatch` are fatal at startup; everything
/// else aborts one cycle.
#[derive(Debug, Error)]
pub enum GuardianError {
    #[error("Unsupported chain id {0}")]
    UnsupportedChain(u64),

    #[error("Registry version mismatch: expected major {expected}, got {actual}")]
    VersionMismatch { expected: u64, actual: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error("Fixture error: {0}")]
    Fixture(String),
}

impl GuardianError {
    /// Label for the failed-cycle metric.
    pub fn source_label(&self) -> &'static str {
        match self {
            GuardianError::Snapshot(e) => e.read().unwrap_or("consistency"),
            GuardianError::Validation(_) => "key_validation",
            GuardianError::Guard(_) => "gateway",
            GuardianError::UnsupportedChain(_)
            | GuardianError::VersionMismatch { .. }
            | GuardianError::Config(_) => "startup",
            GuardianError::Fixture(_) => "fixture",
        }
    }
}

/// Result type for runtime operations
pub type GuardianResult<T> = Result<T, GuardianError>;
