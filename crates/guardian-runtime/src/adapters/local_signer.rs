//! Local guardian wallet.
//!
//! Signs attestations with an in-process secp256k1 key: the message hash is
//! `keccak256(prefix ‖ packed fields)`, every integer packed as a 32-byte
//! big-endian word. Transactions are not broadcast; `submit` records and
//! logs the call, which makes this the dry-run gateway.

use async_trait::async_trait;
use dg_03_key_guard::{ContractCall, GatewayError, GatewayResult, SigningPayload, TransactionGateway};
use k256::ecdsa::SigningKey;
use parking_lot::Mutex;
use sha3::{Digest, Keccak256};
use shared_types::{Address, Bytes32, EcdsaSignature, Hash};
use tracing::{debug, info};

/// Message prefixes of the deposit security contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessagePrefixes {
    pub attest: Hash,
    pub pause: Hash,
    pub unvet: Hash,
}

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&hasher.finalize());
    Hash::from(hash)
}

fn word(value: u64) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[24..].copy_from_slice(&value.to_be_bytes());
    out
}

fn packed_bytes(encoded: &str) -> GatewayResult<Vec<u8>> {
    hex::decode(encoded.strip_prefix("0x").unwrap_or(encoded))
        .map_err(|e| GatewayError::Signing(format!("invalid packed data: {e}")))
}

/// Guardian wallet backed by a local private key.
pub struct LocalWallet {
    key: SigningKey,
    address: Address,
    prefixes: MessagePrefixes,
    submitted: Mutex<Vec<ContractCall>>,
}

impl LocalWallet {
    /// Load a wallet from a hex private key.
    pub fn from_hex(private_key: &str, prefixes: MessagePrefixes) -> GatewayResult<Self> {
        let raw = private_key.trim();
        let bytes = hex::decode(raw.strip_prefix("0x").unwrap_or(raw))
            .map_err(|e| GatewayError::Signing(format!("invalid private key: {e}")))?;
        let key = SigningKey::from_slice(&bytes)
            .map_err(|e| GatewayError::Signing(format!("invalid private key: {e}")))?;

        let public = key.verifying_key().to_encoded_point(false);
        let hash = keccak256(&public.as_bytes()[1..]);
        let address = Address::from_slice(&hash.as_bytes()[12..])
            .map_err(|e| GatewayError::Signing(e.to_string()))?;

        Ok(Self {
            key,
            address,
            prefixes,
            submitted: Mutex::new(Vec::new()),
        })
    }

    /// Bytes whose keccak hash is signed for `payload`.
    pub fn encode(&self, payload: &SigningPayload) -> GatewayResult<Vec<u8>> {
        let mut out = Vec::with_capacity(7 * 32);
        match payload {
            SigningPayload::Deposit {
                deposit_root,
                nonce,
                block_number,
                block_hash,
                staking_module_id,
            } => {
                out.extend_from_slice(self.prefixes.attest.as_bytes());
                out.extend_from_slice(&word(*block_number));
                out.extend_from_slice(block_hash.as_bytes());
                out.extend_from_slice(deposit_root.as_bytes());
                out.extend_from_slice(&word(u64::from(*staking_module_id)));
                out.extend_from_slice(&word(*nonce));
            }
            SigningPayload::Unvet {
                nonce,
                block_number,
                block_hash,
                staking_module_id,
                operator_ids,
                vetted_keys_by_operator,
            } => {
                out.extend_from_slice(self.prefixes.unvet.as_bytes());
                out.extend_from_slice(&word(*block_number));
                out.extend_from_slice(block_hash.as_bytes());
                out.extend_from_slice(&word(u64::from(*staking_module_id)));
                out.extend_from_slice(&word(*nonce));
                out.extend(packed_bytes(operator_ids)?);
                out.extend(packed_bytes(vetted_keys_by_operator)?);
            }
            SigningPayload::Pause {
                block_number,
                staking_module_id,
                ..
            } => {
                out.extend_from_slice(self.prefixes.pause.as_bytes());
                out.extend_from_slice(&word(*block_number));
                if let Some(module_id) = staking_module_id {
                    out.extend_from_slice(&word(u64::from(*module_id)));
                }
            }
        }
        Ok(out)
    }

    /// Calls passed to `submit` so far.
    pub fn submitted_calls(&self) -> Vec<ContractCall> {
        self.submitted.lock().clone()
    }
}

#[async_trait]
impl TransactionGateway for LocalWallet {
    fn guardian_address(&self) -> Address {
        self.address
    }

    async fn sign(&self, payload: &SigningPayload) -> GatewayResult<EcdsaSignature> {
        let digest = keccak256(&self.encode(payload)?);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(digest.as_bytes())
            .map_err(|e| GatewayError::Signing(e.to_string()))?;

        let bytes = signature.to_bytes();
        let r = Bytes32::from_slice(&bytes[..32]).map_err(|e| GatewayError::Signing(e.to_string()))?;
        let s = Bytes32::from_slice(&bytes[32..]).map_err(|e| GatewayError::Signing(e.to_string()))?;

        debug!(digest = %digest, "Payload signed");
        Ok(EcdsaSignature {
            r,
            s,
            v: 27 + recovery_id.to_byte(),
        })
    }

    async fn submit(&self, call: ContractCall) -> GatewayResult<()> {
        info!(call = call.name(), details = ?call, "Dry run: transaction not broadcast");
        self.submitted.lock().push(call);
        Ok(())
    }
}
