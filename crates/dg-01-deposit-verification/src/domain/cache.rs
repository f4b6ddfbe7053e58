//! # Validation Cache
//!
//! Remembers the last verification result per public key so unchanged keys
//! are not re-verified every block.
//!
//! An entry is reused only while every field that feeds the signing root or
//! locates the key (signature, operator, index, module, withdrawal
//! credentials) is unchanged.

use shared_types::{Address, BlsPublicKey, BlsSignature, RegistryKey, WithdrawalCredentials};
use std::collections::HashMap;

/// Cached validity for one public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationCacheEntry {
    pub deposit_signature: BlsSignature,
    pub operator_index: u64,
    pub index: u64,
    pub module_address: Address,
    pub withdrawal_credentials: WithdrawalCredentials,
    pub valid: bool,
}

impl ValidationCacheEntry {
    fn new(key: &RegistryKey, withdrawal_credentials: &WithdrawalCredentials, valid: bool) -> Self {
        Self {
            deposit_signature: key.deposit_signature,
            operator_index: key.operator_index,
            index: key.index,
            module_address: key.module_address,
            withdrawal_credentials: *withdrawal_credentials,
            valid,
        }
    }

    fn matches(&self, key: &RegistryKey, withdrawal_credentials: &WithdrawalCredentials) -> bool {
        self.deposit_signature == key.deposit_signature
            && self.operator_index == key.operator_index
            && self.index == key.index
            && self.module_address == key.module_address
            && self.withdrawal_credentials == *withdrawal_credentials
    }
}

/// Per-key validation results retained across cycles.
#[derive(Debug, Default)]
pub struct ValidationCache {
    entries: HashMap<BlsPublicKey, ValidationCacheEntry>,
}

impl ValidationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached validity, if the entry still describes this key.
    pub fn lookup(
        &self,
        key: &RegistryKey,
        withdrawal_credentials: &WithdrawalCredentials,
    ) -> Option<bool> {
        self.entries
            .get(&key.key)
            .filter(|entry| entry.matches(key, withdrawal_credentials))
            .map(|entry| entry.valid)
    }

    /// Store a fresh result, replacing any stale entry.
    pub fn record(
        &mut self,
        key: &RegistryKey,
        withdrawal_credentials: &WithdrawalCredentials,
        valid: bool,
    ) {
        self.entries.insert(
            key.key,
            ValidationCacheEntry::new(key, withdrawal_credentials, valid),
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
