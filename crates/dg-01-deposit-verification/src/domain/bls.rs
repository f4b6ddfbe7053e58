//! # Deposit Signature Verification (BLS12-381)
//!
//! Pure domain logic for checking a deposit's BLS signature against its
//! domain-separated signing root.
//!
//! ## Implementation Details
//!
//! Ethereum validator keys use the proof-of-possession ciphersuite:
//! - Public keys are on G1 (48 bytes compressed)
//! - Signatures are on G2 (96 bytes compressed)
//!
//! This uses blst's `min_pk` variant.
//!
//! Verification is fail-closed: a key or signature that cannot be parsed, is
//! not in the subgroup, or does not verify is reported as invalid and logged.

use super::entities::{DepositMessage, Domain, ForkVersion};
use super::errors::ValidationError;
use super::fork::{compute_signing_root, deposit_domain, genesis_fork_version};
use super::ssz::{Chunk, HashTreeRoot};
use blst::min_pk::{PublicKey, Signature};
use blst::BLST_ERROR;
use shared_types::{BlsPublicKey, BlsSignature, RegistryKey, WithdrawalCredentials};
use tracing::warn;

/// Domain Separation Tag for BLS signatures (Ethereum 2.0 style)
pub const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

/// Deposit size the protocol submits for every key: 32 ETH in gwei.
pub const DEPOSIT_AMOUNT_GWEI: u64 = 32_000_000_000;

/// Verify a single BLS signature over a message.
///
/// # Errors
/// The blst error for malformed input or a failed pairing check.
pub fn verify_bls(
    message: &[u8],
    signature: &BlsSignature,
    public_key: &BlsPublicKey,
) -> Result<(), BLST_ERROR> {
    let pk = PublicKey::from_bytes(public_key.as_bytes())?;
    let sig = Signature::from_bytes(signature.as_bytes())?;

    // Group-check the signature and validate the public key
    match sig.verify(true, message, DST, &[], &pk, true) {
        BLST_ERROR::BLST_SUCCESS => Ok(()),
        err => Err(err),
    }
}

/// Verifies deposit signatures for one network.
///
/// The domain is derived once from the genesis fork version.
#[derive(Debug, Clone)]
pub struct DepositSignatureVerifier {
    fork_version: ForkVersion,
    domain: Domain,
}

impl DepositSignatureVerifier {
    pub fn new(fork_version: ForkVersion) -> Self {
        Self {
            fork_version,
            domain: deposit_domain(fork_version),
        }
    }

    /// Build a verifier for a chain id.
    ///
    /// # Errors
    /// * `UnsupportedChain` if the chain id is not recognized
    pub fn for_chain(chain_id: u64) -> Result<Self, ValidationError> {
        Ok(Self::new(genesis_fork_version(chain_id)?))
    }

    pub fn fork_version(&self) -> ForkVersion {
        self.fork_version
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Root the depositor signs for this message.
    pub fn signing_root(&self, message: &DepositMessage) -> Chunk {
        compute_signing_root(message.hash_tree_root(), self.domain)
    }

    /// Check a deposit signature. Never fails; anything but a valid
    /// signature returns `false`.
    pub fn verify(&self, message: &DepositMessage, signature: &BlsSignature) -> bool {
        let signing_root = self.signing_root(message);

        match verify_bls(&signing_root, signature, &message.pubkey) {
            Ok(()) => true,
            Err(error) => {
                warn!(
                    pubkey = %message.pubkey,
                    withdrawal_credentials = %message.withdrawal_credentials,
                    amount = message.amount,
                    signature = %signature,
                    error = ?error,
                    "Deposit signature rejected"
                );
                false
            }
        }
    }

    /// Check a registry key's deposit signature for a 32 ETH deposit to the
    /// given withdrawal credentials.
    pub fn verify_key(&self, key: &RegistryKey, withdrawal_credentials: &WithdrawalCredentials) -> bool {
        let message = DepositMessage {
            pubkey: key.key,
            withdrawal_credentials: *withdrawal_credentials,
            amount: DEPOSIT_AMOUNT_GWEI,
        };
        self.verify(&message, &key.deposit_signature)
    }
}
