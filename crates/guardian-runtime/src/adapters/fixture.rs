//! File-backed chain and registry for dry runs.
//!
//! Serves every read port from one JSON document describing a single block:
//! registry modules, operators and keys, deposit history, signing key
//! registrations and the security contract flags. Reads pinned to any other
//! block hash fail with `BlockNotFound`.

use crate::error::{GuardianError, GuardianResult};
use async_trait::async_trait;
use dg_02_block_snapshot::{
    ChainReader, KeyList, ModuleList, RegistryReader, RegistryStatus, SigningKeyEventSource,
    WalletMonitor,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use shared_types::{
    Address, BlockRef, BlsPublicKey, DepositEvent, FreshnessToken, Hash, NodeOperator,
    ReadError, ReadResult, RegistryKey, RegistryMeta, SigningKeyEvent, StakingModule,
    WithdrawalCredentials,
};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Duration;

/// Chain and registry state at one block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub chain_id: u64,
    pub registry_version: String,
    pub block: BlockRef,
    pub freshness_token: FreshnessToken,
    pub modules: Vec<StakingModule>,
    pub operators: BTreeMap<u32, Vec<NodeOperator>>,
    pub keys: Vec<RegistryKey>,
    pub deposit_root: Hash,
    pub deposit_events: Vec<DepositEvent>,
    pub signing_key_events: Vec<SigningKeyEvent>,
    /// Guardian set in index order.
    pub guardians: Vec<Address>,
    pub withdrawal_credentials: WithdrawalCredentials,
    pub deposits_paused: bool,
    pub paused_modules: BTreeSet<u32>,
    pub security_version: u32,
    pub max_operators_per_unvetting: u64,
    pub wallet_balance_critical: bool,
    /// Simulated latency for every read.
    pub read_delay_ms: u64,
}

/// Serves a `Fixture` through the read ports.
#[derive(Debug, Default)]
pub struct FixtureAdapter {
    state: RwLock<Fixture>,
}

impl FixtureAdapter {
    pub fn new(fixture: Fixture) -> Self {
        Self {
            state: RwLock::new(fixture),
        }
    }

    pub fn from_file(path: &Path) -> GuardianResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| GuardianError::Fixture(format!("{}: {e}", path.display())))?;
        let fixture: Fixture = serde_json::from_str(&raw)
            .map_err(|e| GuardianError::Fixture(format!("{}: {e}", path.display())))?;
        Ok(Self::new(fixture))
    }

    /// Mutate the served state, e.g. to advance the block.
    pub fn update(&self, change: impl FnOnce(&mut Fixture)) {
        change(&mut self.state.write());
    }

    pub fn fixture(&self) -> Fixture {
        self.state.read().clone()
    }

    async fn read<T>(&self, get: impl FnOnce(&Fixture) -> ReadResult<T>) -> ReadResult<T> {
        let delay = self.state.read().read_delay_ms;
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        get(&self.state.read())
    }

    async fn read_at<T>(
        &self,
        block_hash: &Hash,
        get: impl FnOnce(&Fixture) -> T,
    ) -> ReadResult<T> {
        let block_hash = *block_hash;
        self.read(move |fixture| {
            if fixture.block.hash != block_hash {
                return Err(ReadError::BlockNotFound(block_hash.to_string()));
            }
            Ok(get(fixture))
        })
        .await
    }

    fn meta(fixture: &Fixture) -> RegistryMeta {
        RegistryMeta {
            block: fixture.block,
            freshness_token: fixture.freshness_token,
        }
    }
}

#[async_trait]
impl RegistryReader for FixtureAdapter {
    async fn status(&self) -> ReadResult<RegistryStatus> {
        self.read(|f| {
            Ok(RegistryStatus {
                chain_id: f.chain_id,
                version: f.registry_version.clone(),
            })
        })
        .await
    }

    async fn list_modules(&self) -> ReadResult<ModuleList> {
        self.read(|f| {
            Ok(ModuleList {
                modules: f.modules.clone(),
                meta: Self::meta(f),
            })
        })
        .await
    }

    async fn list_operators(&self, module_id: u32) -> ReadResult<Vec<NodeOperator>> {
        self.read(|f| Ok(f.operators.get(&module_id).cloned().unwrap_or_default()))
            .await
    }

    async fn list_keys(&self) -> ReadResult<KeyList> {
        self.read(|f| {
            Ok(KeyList {
                keys: f.keys.clone(),
                meta: Self::meta(f),
            })
        })
        .await
    }
}

#[async_trait]
impl ChainReader for FixtureAdapter {
    async fn deposit_root(&self, block_hash: &Hash) -> ReadResult<Hash> {
        self.read_at(block_hash, |f| f.deposit_root).await
    }

    async fn deposit_events(&self, from_block: u64, to_block: u64) -> ReadResult<Vec<DepositEvent>> {
        self.read(|f| {
            Ok(f.deposit_events
                .iter()
                .filter(|e| (from_block..=to_block).contains(&e.block_number))
                .cloned()
                .collect())
        })
        .await
    }

    async fn guardian_index(&self, guardian: &Address, block_hash: &Hash) -> ReadResult<Option<u32>> {
        let guardian = *guardian;
        self.read_at(block_hash, move |f| {
            f.guardians
                .iter()
                .position(|member| *member == guardian)
                .and_then(|index| u32::try_from(index).ok())
        })
        .await
    }

    async fn withdrawal_credentials(&self, block_hash: &Hash) -> ReadResult<WithdrawalCredentials> {
        self.read_at(block_hash, |f| f.withdrawal_credentials).await
    }

    async fn is_deposits_paused(&self, block_hash: &Hash) -> ReadResult<bool> {
        self.read_at(block_hash, |f| f.deposits_paused).await
    }

    async fn is_module_paused(&self, module_id: u32, block_hash: &Hash) -> ReadResult<bool> {
        self.read_at(block_hash, move |f| f.paused_modules.contains(&module_id))
            .await
    }

    async fn security_version(&self, block_hash: &Hash) -> ReadResult<u32> {
        self.read_at(block_hash, |f| f.security_version).await
    }

    async fn max_operators_per_unvetting(&self, block_hash: &Hash) -> ReadResult<u64> {
        self.read_at(block_hash, |f| f.max_operators_per_unvetting).await
    }
}

#[async_trait]
impl WalletMonitor for FixtureAdapter {
    async fn is_balance_critical(&self) -> ReadResult<bool> {
        self.read(|f| Ok(f.wallet_balance_critical)).await
    }
}

#[async_trait]
impl SigningKeyEventSource for FixtureAdapter {
    async fn signing_key_events(
        &self,
        keys: &[BlsPublicKey],
        to_block: u64,
    ) -> ReadResult<Vec<SigningKeyEvent>> {
        let wanted: BTreeSet<BlsPublicKey> = keys.iter().copied().collect();
        self.read(move |f| {
            Ok(f.signing_key_events
                .iter()
                .filter(|e| e.block_number <= to_block && wanted.contains(&e.key))
                .cloned()
                .collect())
        })
        .await
    }
}
