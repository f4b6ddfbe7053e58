//! # Inbound Ports (Driving Ports / API)
//!
//! Traits that define the public API of this subsystem.

use crate::domain::errors::ValidationResult;
use async_trait::async_trait;
use shared_types::{RegistryKey, WithdrawalCredentials};

/// Key validation API.
///
/// Callers see a plain "keys in, invalid keys out" contract; how the work is
/// spread across threads and cached is an implementation detail.
#[async_trait]
pub trait KeyValidationApi: Send + Sync {
    /// Return the keys whose deposit signature does not verify for a 32 ETH
    /// deposit to `withdrawal_credentials`, in input order.
    ///
    /// # Errors
    /// * `WorkerFailure` if validation could not cover every key
    async fn invalid_keys(
        &self,
        withdrawal_credentials: &WithdrawalCredentials,
        keys: &[RegistryKey],
    ) -> ValidationResult<Vec<RegistryKey>>;
}
