//! # Deposit Entities
//!
//! SSZ containers that make up a deposit signing root.

use super::ssz::{bytes_root, hash_pair, merkleize, uint64_root, Chunk, HashTreeRoot};
use shared_types::{BlsPublicKey, Bytes32, WithdrawalCredentials};

/// A 4-byte fork version.
pub type ForkVersion = [u8; 4];

/// A 4-byte domain type tag.
pub type DomainType = [u8; 4];

/// A 32-byte signing domain.
pub type Domain = [u8; 32];

/// The message a validator signs when making a deposit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositMessage {
    pub pubkey: BlsPublicKey,
    pub withdrawal_credentials: WithdrawalCredentials,
    /// Amount in gwei.
    pub amount: u64,
}

impl HashTreeRoot for DepositMessage {
    fn hash_tree_root(&self) -> Chunk {
        merkleize(&[
            bytes_root(self.pubkey.as_bytes()),
            *self.withdrawal_credentials.as_bytes(),
            uint64_root(self.amount),
        ])
    }
}

/// Fork data used to derive a signing domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkData {
    pub current_version: ForkVersion,
    pub genesis_validators_root: Bytes32,
}

impl HashTreeRoot for ForkData {
    fn hash_tree_root(&self) -> Chunk {
        hash_pair(
            &bytes_root(&self.current_version),
            self.genesis_validators_root.as_bytes(),
        )
    }
}

/// An object root bound to a signing domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningData {
    pub object_root: Chunk,
    pub domain: Domain,
}

impl HashTreeRoot for SigningData {
    fn hash_tree_root(&self) -> Chunk {
        hash_pair(&self.object_root, &self.domain)
    }
}
