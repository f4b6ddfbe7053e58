//! Driven Ports (SPI - Outbound Dependencies)
//!
//! Read-only collaborators the guardian consults every cycle. Transport,
//! ABI decoding and event caching live behind these traits.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{
    Address, BlsPublicKey, DepositEvent, Hash, NodeOperator, ReadResult, RegistryKey,
    RegistryMeta, SigningKeyEvent, StakingModule, WithdrawalCredentials,
};

/// Registry service status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStatus {
    pub chain_id: u64,
    /// Semantic version of the registry service.
    pub version: String,
}

/// Staking modules plus the registry state they were read at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleList {
    pub modules: Vec<StakingModule>,
    pub meta: RegistryMeta,
}

/// Every registry key plus the registry state they were read at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyList {
    pub keys: Vec<RegistryKey>,
    pub meta: RegistryMeta,
}

/// Registry of staking modules, operators and keys.
#[async_trait]
pub trait RegistryReader: Send + Sync {
    async fn status(&self) -> ReadResult<RegistryStatus>;

    /// Minimal status read; its meta token anchors the full key fetch.
    async fn list_modules(&self) -> ReadResult<ModuleList>;

    async fn list_operators(&self, module_id: u32) -> ReadResult<Vec<NodeOperator>>;

    /// All keys of all modules, used and unused.
    async fn list_keys(&self) -> ReadResult<KeyList>;
}

/// Contract reads, each pinned to a block hash.
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn deposit_root(&self, block_hash: &Hash) -> ReadResult<Hash>;

    /// Deposit events in `[from_block, to_block]`.
    async fn deposit_events(&self, from_block: u64, to_block: u64)
        -> ReadResult<Vec<DepositEvent>>;

    /// Index of `guardian` in the guardian set, `None` if not a member.
    async fn guardian_index(&self, guardian: &Address, block_hash: &Hash)
        -> ReadResult<Option<u32>>;

    /// Withdrawal credentials the protocol deposits with.
    async fn withdrawal_credentials(&self, block_hash: &Hash) -> ReadResult<WithdrawalCredentials>;

    async fn is_deposits_paused(&self, block_hash: &Hash) -> ReadResult<bool>;

    async fn is_module_paused(&self, module_id: u32, block_hash: &Hash) -> ReadResult<bool>;

    /// Version of the deposit security contract.
    async fn security_version(&self, block_hash: &Hash) -> ReadResult<u32>;

    async fn max_operators_per_unvetting(&self, block_hash: &Hash) -> ReadResult<u64>;
}

/// Guardian wallet health.
#[async_trait]
pub trait WalletMonitor: Send + Sync {
    /// Balance too low to pay for on-chain transactions.
    async fn is_balance_critical(&self) -> ReadResult<bool>;
}

/// Ordering source for signing key registrations.
#[async_trait]
pub trait SigningKeyEventSource: Send + Sync {
    /// Registration events for `keys` up to `to_block`, in chain order.
    async fn signing_key_events(
        &self,
        keys: &[BlsPublicKey],
        to_block: u64,
    ) -> ReadResult<Vec<SigningKeyEvent>>;
}
