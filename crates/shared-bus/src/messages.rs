//! # Guardian Messages
//!
//! The four message kinds a guardian publishes to the message bus.
//!
//! Messages are a tagged union; recipients dispatch on the `type` tag and
//! never on field presence. Every message carries the guardian address and
//! index so recipients can attribute it and de-duplicate across guardians.

use serde::{Deserialize, Serialize};
use shared_types::{Address, EcdsaSignature, Hash};

/// Application metadata attached to every message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMeta {
    pub name: String,
    pub version: String,
}

/// Liveness signal sent once per processed block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingMessage {
    pub block_number: u64,
    pub staking_module_ids: Vec<u32>,
}

/// Attestation that deposits into a module are safe at the given state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositMessage {
    pub block_number: u64,
    pub block_hash: Hash,
    pub deposit_root: Hash,
    pub staking_module_id: u32,
    pub nonce: u64,
    pub signature: EcdsaSignature,
}

/// Instruction to lower vetted key counts for a chunk of operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnvetMessage {
    pub block_number: u64,
    pub block_hash: Hash,
    pub staking_module_id: u32,
    pub nonce: u64,
    /// Packed 8-byte big-endian operator ids, `0x`-prefixed hex.
    pub operator_ids: String,
    /// Packed 16-byte big-endian vetted counts, `0x`-prefixed hex.
    pub vetted_keys_by_operator: String,
    pub signature: EcdsaSignature,
}

/// Emergency instruction to pause deposits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseMessage {
    pub block_number: u64,
    pub block_hash: Hash,
    /// `None` for the module-independent pause mechanism.
    pub staking_module_id: Option<u32>,
    pub signature: EcdsaSignature,
}

/// Message body by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageBody {
    Ping(PingMessage),
    Deposit(DepositMessage),
    Unvet(UnvetMessage),
    Pause(PauseMessage),
}

impl MessageBody {
    /// Short kind name used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            MessageBody::Ping(_) => "ping",
            MessageBody::Deposit(_) => "deposit",
            MessageBody::Unvet(_) => "unvet",
            MessageBody::Pause(_) => "pause",
        }
    }

    /// Module the message refers to, if any.
    pub fn staking_module_id(&self) -> Option<u32> {
        match self {
            MessageBody::Ping(_) => None,
            MessageBody::Deposit(m) => Some(m.staking_module_id),
            MessageBody::Unvet(m) => Some(m.staking_module_id),
            MessageBody::Pause(m) => m.staking_module_id,
        }
    }
}

/// A message attributed to one guardian.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardianMessage {
    pub guardian_address: Address,
    pub guardian_index: u32,
    pub app: AppMeta,
    #[serde(flatten)]
    pub body: MessageBody,
}

impl GuardianMessage {
    pub fn kind(&self) -> &'static str {
        self.body.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(body: MessageBody) -> GuardianMessage {
        GuardianMessage {
            guardian_address: Address([0xaa; 20]),
            guardian_index: 3,
            app: AppMeta {
                name: "deposit-guardian".to_string(),
                version: "0.1.0".to_string(),
            },
            body,
        }
    }

    #[test]
    fn test_message_serializes_with_type_tag() {
        let msg = sample(MessageBody::Ping(PingMessage {
            block_number: 42,
            staking_module_ids: vec![1, 2],
        }));

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "ping");
        assert_eq!(json["block_number"], 42);
        assert_eq!(json["guardian_index"], 3);
    }

    #[test]
    fn test_message_tag_selects_variant_on_decode() {
        let msg = sample(MessageBody::Pause(PauseMessage {
            block_number: 7,
            block_hash: Hash::ZERO,
            staking_module_id: Some(1),
            signature: EcdsaSignature::default(),
        }));

        let json = serde_json::to_string(&msg).unwrap();
        let back: GuardianMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind(), "pause");
        assert_eq!(back.body.staking_module_id(), Some(1));
    }
}
