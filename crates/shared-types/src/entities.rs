//! # Core Domain Entities
//!
//! Defines the entities every guardian subsystem reasons about: registry
//! keys, deposit history, signing-key registrations, staking modules and
//! the block references that pin reads together.
//!
//! ## Clusters
//!
//! - **Primitives**: `Bytes32`, `Address`, `BlsPublicKey`, `BlsSignature`
//! - **Registry**: `RegistryKey`, `KeyIdentity`, `StakingModule`, `NodeOperator`
//! - **Chain history**: `DepositEvent`, `SigningKeyEvent`, `BlockRef`
//! - **Attestation**: `EcdsaSignature`

use crate::errors::HexError;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// PRIMITIVES
// =============================================================================

macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            /// Width in bytes.
            pub const LEN: usize = $len;

            /// All-zero value.
            pub const ZERO: Self = Self([0u8; $len]);

            /// Borrow the raw bytes.
            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            /// Build from a slice, checking the width.
            pub fn from_slice(bytes: &[u8]) -> Result<Self, HexError> {
                let array: [u8; $len] = bytes.try_into().map_err(|_| HexError::InvalidLength {
                    expected: $len,
                    actual: bytes.len(),
                })?;
                Ok(Self(array))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::ZERO
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(self, f)
            }
        }

        impl FromStr for $name {
            type Err = HexError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s.strip_prefix("0x").unwrap_or(s);
                let bytes = hex::decode(raw).map_err(|e| HexError::InvalidHex(e.to_string()))?;
                Self::from_slice(&bytes)
            }
        }
    };
}

fixed_bytes!(
    /// A 32-byte word: block hashes, deposit roots, withdrawal credentials.
    Bytes32,
    32
);

fixed_bytes!(
    /// A 20-byte Ethereum address.
    Address,
    20
);

fixed_bytes!(
    /// A compressed BLS12-381 G1 public key (validator key).
    BlsPublicKey,
    48
);

fixed_bytes!(
    /// A compressed BLS12-381 G2 signature (deposit signature).
    BlsSignature,
    96
);

/// Block, transaction and deposit-root hashes.
pub type Hash = Bytes32;

/// Withdrawal credentials attached to a deposit.
pub type WithdrawalCredentials = Bytes32;

/// Opaque marker proving two registry reads describe the same state.
pub type FreshnessToken = Bytes32;

// =============================================================================
// REGISTRY
// =============================================================================

/// Identity of a registry key: `(module address, operator index, index)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct KeyIdentity {
    pub module_address: Address,
    pub operator_index: u64,
    pub index: u64,
}

impl fmt::Display for KeyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.module_address, self.operator_index, self.index
        )
    }
}

/// A validator key registered by a node operator in a staking module.
///
/// Only `used` and `vetted` change over the lifetime of a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryKey {
    pub key: BlsPublicKey,
    pub deposit_signature: BlsSignature,
    pub operator_index: u64,
    pub module_address: Address,
    /// Registration order within the operator.
    pub index: u64,
    pub used: bool,
    pub vetted: bool,
}

impl RegistryKey {
    pub fn identity(&self) -> KeyIdentity {
        KeyIdentity {
            module_address: self.module_address,
            operator_index: self.operator_index,
            index: self.index,
        }
    }
}

/// A staking module as listed by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingModule {
    pub id: u32,
    pub address: Address,
    /// Changes on any key or operator update inside the module.
    pub nonce: u64,
    #[serde(default)]
    pub paused: bool,
}

/// A node operator inside one staking module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeOperator {
    pub index: u64,
    pub staking_limit: u64,
    pub used_key_count: u64,
}

impl NodeOperator {
    /// Number of keys after the used ones that may be deposited next.
    pub fn vetted_window(&self) -> u64 {
        self.staking_limit.saturating_sub(self.used_key_count)
    }
}

// =============================================================================
// CHAIN HISTORY
// =============================================================================

/// A block number and hash pair used to pin reads to one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct BlockRef {
    pub number: u64,
    pub hash: Hash,
}

/// Registry response metadata: the block it was built at and its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RegistryMeta {
    pub block: BlockRef,
    pub freshness_token: FreshnessToken,
}

/// A deposit observed on the deposit contract.
///
/// Ordered by `(block_number, log_index)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositEvent {
    pub pubkey: BlsPublicKey,
    pub withdrawal_credentials: WithdrawalCredentials,
    /// Amount in gwei.
    pub amount: u64,
    pub signature: BlsSignature,
    /// Signature already checked against the network deposit domain.
    pub valid: bool,
    pub tx_hash: Hash,
    pub block_number: u64,
    pub block_hash: Hash,
    pub log_index: u64,
}

impl DepositEvent {
    /// Position of the event in chain order.
    pub fn position(&self) -> (u64, u64) {
        (self.block_number, self.log_index)
    }
}

/// A signing key registration emitted by a staking module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningKeyEvent {
    pub module_address: Address,
    pub operator_index: u64,
    pub key: BlsPublicKey,
    pub block_number: u64,
    pub block_hash: Hash,
    pub log_index: u64,
}

// =============================================================================
// ATTESTATION
// =============================================================================

/// A recoverable secp256k1 signature produced by the guardian wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EcdsaSignature {
    pub r: Bytes32,
    pub s: Bytes32,
    /// Recovery id, 27 or 28.
    pub v: u8,
}
