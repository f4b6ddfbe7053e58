//! Error types for the Block Snapshot subsystem

use shared_types::{FreshnessToken, ReadError};
use thiserror::Error;

/// Block snapshot errors
///
/// Every variant aborts the current cycle; the next cycle starts from
/// scratch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnapshotError {
    /// An external read returned an error
    #[error("Read `{read}` failed: {error}")]
    ReadFailed {
        read: &'static str,
        #[source]
        error: ReadError,
    },

    /// An external read exceeded its time budget
    #[error("Read `{read}` timed out after {after_ms}ms")]
    Timeout { read: &'static str, after_ms: u64 },

    /// The registry changed between the status read and the full fetch
    #[error("Inconsistent registry state: expected token {expected}, got {actual}")]
    InconsistentState {
        expected: FreshnessToken,
        actual: FreshnessToken,
    },
}

impl SnapshotError {
    /// Name of the read that failed, if the error came from one.
    pub fn read(&self) -> Option<&'static str> {
        match self {
            SnapshotError::ReadFailed { read, .. } | SnapshotError::Timeout { read, .. } => {
                Some(read)
            }
            SnapshotError::InconsistentState { .. } => None,
        }
    }
}

/// Result type for snapshot operations
pub type SnapshotResult<T> = Result<T, SnapshotError>;
