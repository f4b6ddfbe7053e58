//! Driven Ports (SPI - Outbound Dependencies)
//!
//! The guardian wallet: signs attestations and submits the on-chain calls
//! the guard may trigger directly.

use crate::error::GatewayResult;
use async_trait::async_trait;
use shared_types::{Address, EcdsaSignature, Hash};

/// Data the guardian attests to, by message kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningPayload {
    Deposit {
        deposit_root: Hash,
        nonce: u64,
        block_number: u64,
        block_hash: Hash,
        staking_module_id: u32,
    },
    Unvet {
        nonce: u64,
        block_number: u64,
        block_hash: Hash,
        staking_module_id: u32,
        operator_ids: String,
        vetted_keys_by_operator: String,
    },
    /// `staking_module_id` is `None` for the module-independent pause.
    Pause {
        block_number: u64,
        block_hash: Hash,
        staking_module_id: Option<u32>,
    },
}

/// On-chain calls the guard submits itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractCall {
    Unvet {
        block_number: u64,
        block_hash: Hash,
        staking_module_id: u32,
        nonce: u64,
        operator_ids: String,
        vetted_keys_by_operator: String,
        signature: EcdsaSignature,
    },
    /// Legacy per-module pause.
    PauseModule {
        block_number: u64,
        staking_module_id: u32,
        signature: EcdsaSignature,
    },
}

impl ContractCall {
    pub fn name(&self) -> &'static str {
        match self {
            ContractCall::Unvet { .. } => "unvetSigningKeys",
            ContractCall::PauseModule { .. } => "pauseDeposits",
        }
    }
}

/// Guardian wallet.
#[async_trait]
pub trait TransactionGateway: Send + Sync {
    fn guardian_address(&self) -> Address;

    async fn sign(&self, payload: &SigningPayload) -> GatewayResult<EcdsaSignature>;

    /// Submit a call; returns once the transaction is sent.
    async fn submit(&self, call: ContractCall) -> GatewayResult<()>;
}
