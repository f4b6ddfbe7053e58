//! Block Snapshot Service - consistent reads for one cycle
//!
//! `BlockSnapshotCollector` gathers every block-scoped fact at one block
//! hash concurrently and fails as a whole if any single read fails or
//! times out. `RegistryService` fronts the registry reads and keeps the
//! full key list behind a `ConsistencyCache`.

use crate::domain::{BlockSnapshot, ConsistencyCache};
use crate::error::{SnapshotError, SnapshotResult};
use crate::ports::outbound::{
    ChainReader, ModuleList, RegistryReader, RegistryStatus, SigningKeyEventSource,
    WalletMonitor,
};
use futures::future::try_join_all;
use shared_types::{
    Address, BlockRef, BlsPublicKey, DepositEvent, FreshnessToken, NodeOperator, ReadResult,
    RegistryKey, SigningKeyEvent,
};
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// Snapshot configuration
#[derive(Clone, Debug)]
pub struct SnapshotConfig {
    /// Upper bound for any single external read
    pub read_timeout: Duration,
    /// First block of deposit history (deposit contract deployment)
    pub deposit_events_from_block: u64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_secs(30),
            deposit_events_from_block: 0,
        }
    }
}

/// Run one external read under a timeout, naming it in any error.
pub async fn bounded<T, F>(read: &'static str, limit: Duration, fut: F) -> SnapshotResult<T>
where
    F: Future<Output = ReadResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(SnapshotError::ReadFailed { read, error }),
        Err(_) => Err(SnapshotError::Timeout {
            read,
            after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}

// =============================================================================
// BLOCK SNAPSHOT COLLECTOR
// =============================================================================

/// Collects a `BlockSnapshot` for a target block.
pub struct BlockSnapshotCollector<C: ChainReader, W: WalletMonitor> {
    chain: Arc<C>,
    wallet: Arc<W>,
    guardian_address: Address,
    config: SnapshotConfig,
}

impl<C: ChainReader, W: WalletMonitor> BlockSnapshotCollector<C, W> {
    pub fn new(chain: Arc<C>, wallet: Arc<W>, guardian_address: Address, config: SnapshotConfig) -> Self {
        Self {
            chain,
            wallet,
            guardian_address,
            config,
        }
    }

    /// Read every block-scoped fact pinned to `block.hash`.
    ///
    /// # Errors
    /// The first failed or timed out read; no partial snapshot is returned.
    pub async fn collect(&self, block: BlockRef, module_ids: &[u32]) -> SnapshotResult<BlockSnapshot> {
        let hash = block.hash;
        let limit = self.config.read_timeout;
        let chain = &self.chain;

        let module_pauses = try_join_all(module_ids.iter().map(|&module_id| async move {
            bounded(
                "is_module_paused",
                limit,
                chain.is_module_paused(module_id, &hash),
            )
            .await
            .map(|paused| (module_id, paused))
        }));

        let (
            deposit_root,
            events,
            guardian_index,
            withdrawal_credentials,
            deposits_paused,
            security_version,
            max_operators_per_unvetting,
            wallet_balance_critical,
            module_pauses,
        ) = tokio::try_join!(
            bounded("deposit_root", limit, chain.deposit_root(&hash)),
            bounded(
                "deposit_events",
                limit,
                chain.deposit_events(self.config.deposit_events_from_block, block.number),
            ),
            bounded(
                "guardian_index",
                limit,
                chain.guardian_index(&self.guardian_address, &hash),
            ),
            bounded("withdrawal_credentials", limit, chain.withdrawal_credentials(&hash)),
            bounded("is_deposits_paused", limit, chain.is_deposits_paused(&hash)),
            bounded("security_version", limit, chain.security_version(&hash)),
            bounded(
                "max_operators_per_unvetting",
                limit,
                chain.max_operators_per_unvetting(&hash),
            ),
            bounded("wallet_balance", limit, self.wallet.is_balance_critical()),
            module_pauses,
        )?;

        let mut deposit_events: Vec<DepositEvent> = events
            .into_iter()
            .filter(|event| event.block_number <= block.number)
            .collect();
        deposit_events.sort_by_key(DepositEvent::position);

        let paused_modules: BTreeSet<u32> = module_pauses
            .into_iter()
            .filter_map(|(module_id, paused)| paused.then_some(module_id))
            .collect();

        debug!(
            block_number = block.number,
            block_hash = %block.hash,
            deposit_root = %deposit_root,
            deposit_events = deposit_events.len(),
            guardian_index = ?guardian_index,
            "Block snapshot collected"
        );

        Ok(BlockSnapshot {
            block,
            deposit_root,
            guardian_address: self.guardian_address,
            guardian_index,
            withdrawal_credentials,
            deposits_paused,
            paused_modules,
            security_version,
            max_operators_per_unvetting,
            wallet_balance_critical,
            deposit_events,
        })
    }
}

// =============================================================================
// REGISTRY SERVICE
// =============================================================================

/// Registry reads with timeouts and a consistency-checked key cache.
pub struct RegistryService<R: RegistryReader, S: SigningKeyEventSource> {
    registry: Arc<R>,
    signing_keys: Arc<S>,
    keys: Mutex<ConsistencyCache<Vec<RegistryKey>>>,
    read_timeout: Duration,
}

impl<R: RegistryReader, S: SigningKeyEventSource> RegistryService<R, S> {
    pub fn new(registry: Arc<R>, signing_keys: Arc<S>, read_timeout: Duration) -> Self {
        Self {
            registry,
            signing_keys,
            keys: Mutex::new(ConsistencyCache::new()),
            read_timeout,
        }
    }

    pub async fn status(&self) -> SnapshotResult<RegistryStatus> {
        bounded("status", self.read_timeout, self.registry.status()).await
    }

    pub async fn modules(&self) -> SnapshotResult<ModuleList> {
        bounded("list_modules", self.read_timeout, self.registry.list_modules()).await
    }

    pub async fn operators(&self, module_id: u32) -> SnapshotResult<Vec<NodeOperator>> {
        bounded(
            "list_operators",
            self.read_timeout,
            self.registry.list_operators(module_id),
        )
        .await
    }

    /// Full key list consistent with `expected`.
    ///
    /// # Errors
    /// * `InconsistentState` if the registry moved since `expected` was read
    pub async fn keys(&self, expected: FreshnessToken) -> SnapshotResult<Arc<Vec<RegistryKey>>> {
        let mut cache = self.keys.lock().await;
        cache
            .get_or_fetch(expected, || async {
                let list = bounded("list_keys", self.read_timeout, self.registry.list_keys()).await?;
                Ok((list.keys, list.meta.freshness_token))
            })
            .await
    }

    /// Registration events for `keys` up to `to_block`.
    pub async fn registrations(
        &self,
        keys: &[BlsPublicKey],
        to_block: u64,
    ) -> SnapshotResult<Vec<SigningKeyEvent>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        bounded(
            "signing_key_events",
            self.read_timeout,
            self.signing_keys.signing_key_events(keys, to_block),
        )
        .await
    }
}
