//! # Signing Domains
//!
//! Resolves the genesis fork version for a chain id and derives the deposit
//! signing domain from it.
//!
//! Deposits are signed over the genesis fork with a zero genesis validators
//! root, so the domain depends only on the network.

use super::entities::{Domain, DomainType, ForkData, ForkVersion, SigningData};
use super::errors::ValidationError;
use super::ssz::{Chunk, HashTreeRoot};
use shared_types::Bytes32;

/// Domain type tag for deposits.
pub const DOMAIN_DEPOSIT: DomainType = [0x03, 0x00, 0x00, 0x00];

/// Genesis validators root used for deposit domains.
pub const ZERO_GENESIS_VALIDATORS_ROOT: Bytes32 = Bytes32::ZERO;

/// Genesis fork version for a chain id.
///
/// # Errors
/// * `UnsupportedChain` for a chain with no known fork version
pub fn genesis_fork_version(chain_id: u64) -> Result<ForkVersion, ValidationError> {
    match chain_id {
        1 => Ok([0x00, 0x00, 0x00, 0x00]),
        5 => Ok([0x00, 0x00, 0x10, 0x20]),
        17000 => Ok([0x01, 0x01, 0x70, 0x00]),
        11155111 => Ok([0x90, 0x00, 0x00, 0x69]),
        other => Err(ValidationError::UnsupportedChain(other)),
    }
}

/// `domain_type || fork_data_root[..28]`
pub fn compute_domain(
    domain_type: DomainType,
    fork_version: ForkVersion,
    genesis_validators_root: Bytes32,
) -> Domain {
    let fork_data_root = ForkData {
        current_version: fork_version,
        genesis_validators_root,
    }
    .hash_tree_root();

    let mut domain = Domain::default();
    domain[..4].copy_from_slice(&domain_type);
    domain[4..].copy_from_slice(&fork_data_root[..28]);
    domain
}

/// Deposit domain for a fork version.
pub fn deposit_domain(fork_version: ForkVersion) -> Domain {
    compute_domain(DOMAIN_DEPOSIT, fork_version, ZERO_GENESIS_VALIDATORS_ROOT)
}

/// Root actually signed: the object root bound to its domain.
pub fn compute_signing_root(object_root: Chunk, domain: Domain) -> Chunk {
    SigningData {
        object_root,
        domain,
    }
    .hash_tree_root()
}
