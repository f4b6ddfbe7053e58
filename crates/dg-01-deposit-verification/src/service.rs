//! # Key Validation Service
//!
//! Application service layer that implements the `KeyValidationApi` trait.
//!
//! ## Architecture
//!
//! This is the hexagonal "application service" that:
//! - Implements the inbound port (`KeyValidationApi`)
//! - Consults the `ValidationCache` before doing any cryptography
//! - Delegates the remaining signature checks to the `VerificationPool`

use crate::domain::bls::DepositSignatureVerifier;
use crate::domain::cache::ValidationCache;
use crate::domain::errors::ValidationResult;
use crate::pool::VerificationPool;
use crate::ports::inbound::KeyValidationApi;
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{RegistryKey, WithdrawalCredentials};
use std::sync::Arc;
use tracing::debug;

/// Key Validation Service.
///
/// Holds the network verifier, the worker pool and the cross-cycle cache.
pub struct KeyValidationService {
    verifier: Arc<DepositSignatureVerifier>,
    pool: VerificationPool,
    cache: Mutex<ValidationCache>,
}

impl KeyValidationService {
    pub fn new(verifier: DepositSignatureVerifier, pool: VerificationPool) -> Self {
        Self {
            verifier: Arc::new(verifier),
            pool,
            cache: Mutex::new(ValidationCache::new()),
        }
    }

    pub fn verifier(&self) -> &DepositSignatureVerifier {
        &self.verifier
    }

    /// Number of keys with a cached result.
    pub fn cached_keys(&self) -> usize {
        self.cache.lock().len()
    }
}

#[async_trait]
impl KeyValidationApi for KeyValidationService {
    async fn invalid_keys(
        &self,
        withdrawal_credentials: &WithdrawalCredentials,
        keys: &[RegistryKey],
    ) -> ValidationResult<Vec<RegistryKey>> {
        let mut validity: Vec<Option<bool>> = Vec::with_capacity(keys.len());
        let mut pending: Vec<(usize, RegistryKey)> = Vec::new();

        {
            let cache = self.cache.lock();
            for (position, key) in keys.iter().enumerate() {
                let cached = cache.lookup(key, withdrawal_credentials);
                if cached.is_none() {
                    pending.push((position, key.clone()));
                }
                validity.push(cached);
            }
        }

        let cache_hits = keys.len() - pending.len();
        debug!(
            keys = keys.len(),
            cache_hits = cache_hits,
            to_verify = pending.len(),
            "Validating deposit signatures"
        );

        let verifier = Arc::clone(&self.verifier);
        let wc = *withdrawal_credentials;
        let verified = self
            .pool
            .run(pending, move |(position, key)| {
                let valid = verifier.verify_key(&key, &wc);
                (position, key, valid)
            })
            .await?;

        {
            let mut cache = self.cache.lock();
            for (position, key, valid) in &verified {
                cache.record(key, withdrawal_credentials, *valid);
                validity[*position] = Some(*valid);
            }
        }

        Ok(keys
            .iter()
            .zip(validity)
            .filter(|(_, valid)| *valid == Some(false))
            .map(|(key, _)| key.clone())
            .collect())
    }
}
