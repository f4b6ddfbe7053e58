//! # Guardian Cycle
//!
//! One pass of the guardian over the registry's current block.
//!
//! ## Phases
//!
//! 1. Snapshot: module list, block-scoped chain facts, the full key list
//!    and every module's operators, read concurrently
//! 2. Findings: global checks (historical theft, duplicates) then per-module
//!    data, computed for all modules before any action; any failure aborts
//! 3. Actions: one guard decision per module, executed concurrently; a
//!    failing module is logged and does not stop the others
//!
//! The block is marked processed only when every module was handled. Until
//! then the block guard keeps the unfinished cycle's live window, so a
//! pause that failed to sign is retried as a live front-run.
//!
//! A second caller while a cycle is in flight gets `AlreadyRunning`.

use crate::error::{GuardianError, GuardianResult};
use dg_01_deposit_verification::KeyValidationApi;
use dg_02_block_snapshot::{
    BlockCheck, BlockGuard, BlockSnapshot, BlockSnapshotCollector, ChainReader, RegistryReader,
    RegistryService, SigningKeyEventSource, SnapshotError, WalletMonitor,
};
use dg_03_key_guard::{
    detect_front_run, detect_historical_front_run, duplicated_pubkeys, resolve_duplicates,
    vetted_unused_keys, DuplicateResolution, GuardError, GuardReport, RegistrationIndex,
    StakingModuleData, StakingModuleGuard, TransactionGateway,
};
use futures::future::{join_all, try_join_all};
use guardian_telemetry::{
    log_block_event, log_module_event, time_histogram, CYCLES, CYCLE_DURATION, DUPLICATED_KEYS,
    GUARD_ACTIONS, INCONSISTENT_READS, INTERSECTIONS, INVALID_KEYS, KEY_VALIDATION_DURATION,
    LAST_PROCESSED_BLOCK, MESSAGES_SENT, READ_ERRORS,
};
use parking_lot::Mutex;
use shared_bus::MessagePublisher;
use shared_types::{BlockRef, FreshnessToken, NodeOperator, RegistryKey, StakingModule};
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

// =============================================================================
// OUTCOME
// =============================================================================

/// Result of a completed cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub block: BlockRef,
    /// One report per module whose action succeeded.
    pub reports: Vec<GuardReport>,
    /// Modules whose action failed this cycle.
    pub failures: Vec<(u32, GuardError)>,
    pub ping_sent: bool,
}

impl CycleReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn report_for(&self, module_id: u32) -> Option<&GuardReport> {
        self.reports.iter().find(|report| report.module_id == module_id)
    }
}

/// What a call to `GuardianCycle::run` did.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    Completed(CycleReport),
    /// Another cycle held the lock.
    AlreadyRunning,
    /// The registry block hash was already processed.
    AlreadyProcessed { block_number: u64 },
    /// The registry reported a block older than the last processed one.
    Stale { block_number: u64, last_processed: u64 },
}

impl CycleOutcome {
    /// Label for the cycle metric.
    pub fn label(&self) -> &'static str {
        match self {
            CycleOutcome::Completed(report) if !report.is_complete() => "partial",
            CycleOutcome::Completed(_) => "completed",
            CycleOutcome::AlreadyRunning => "already_running",
            CycleOutcome::AlreadyProcessed { .. } => "unchanged_block",
            CycleOutcome::Stale { .. } => "stale_block",
        }
    }
}

// =============================================================================
// GUARDIAN CYCLE
// =============================================================================

/// Per-block driver over the snapshot, validation and guard subsystems.
pub struct GuardianCycle<R, S, C, W, V, G, P>
where
    R: RegistryReader,
    S: SigningKeyEventSource,
    C: ChainReader,
    W: WalletMonitor,
    V: KeyValidationApi,
    G: TransactionGateway,
    P: MessagePublisher,
{
    registry: RegistryService<R, S>,
    collector: BlockSnapshotCollector<C, W>,
    validator: Arc<V>,
    guard: StakingModuleGuard<G, P>,
    block_guard: Mutex<BlockGuard>,
    running: tokio::sync::Mutex<()>,
}

impl<R, S, C, W, V, G, P> GuardianCycle<R, S, C, W, V, G, P>
where
    R: RegistryReader,
    S: SigningKeyEventSource,
    C: ChainReader,
    W: WalletMonitor,
    V: KeyValidationApi,
    G: TransactionGateway,
    P: MessagePublisher,
{
    pub fn new(
        registry: RegistryService<R, S>,
        collector: BlockSnapshotCollector<C, W>,
        validator: Arc<V>,
        guard: StakingModuleGuard<G, P>,
    ) -> Self {
        Self {
            registry,
            collector,
            validator,
            guard,
            block_guard: Mutex::new(BlockGuard::new()),
            running: tokio::sync::Mutex::new(()),
        }
    }

    pub fn registry(&self) -> &RegistryService<R, S> {
        &self.registry
    }

    pub fn guard(&self) -> &StakingModuleGuard<G, P> {
        &self.guard
    }

    pub fn last_processed(&self) -> Option<BlockRef> {
        self.block_guard.lock().last_processed()
    }

    /// Run one cycle unless another is in flight.
    ///
    /// # Errors
    /// Any snapshot read, key validation or encoding failure that aborts
    /// the cycle. The block is not marked processed and the next cycle
    /// retries it.
    pub async fn run(&self) -> GuardianResult<CycleOutcome> {
        let Ok(_running) = self.running.try_lock() else {
            debug!("Previous cycle still running, skipping");
            CYCLES.with_label_values(&["already_running"]).inc();
            return Ok(CycleOutcome::AlreadyRunning);
        };

        let span = info_span!("guardian_cycle", cycle_id = %Uuid::new_v4());
        let result = async {
            let _timer = time_histogram!(CYCLE_DURATION);
            self.run_locked().await
        }
        .instrument(span)
        .await;

        match &result {
            Ok(outcome) => CYCLES.with_label_values(&[outcome.label()]).inc(),
            Err(e) => {
                CYCLES.with_label_values(&["failed"]).inc();
                match e {
                    GuardianError::Snapshot(SnapshotError::InconsistentState { .. }) => {
                        INCONSISTENT_READS.inc()
                    }
                    other => READ_ERRORS.with_label_values(&[other.source_label()]).inc(),
                }
            }
        }
        result
    }

    async fn run_locked(&self) -> GuardianResult<CycleOutcome> {
        let modules = self.registry.modules().await.map_err(|e| {
            error!(error = %e, "Guardian cycle aborted: staking modules unavailable");
            GuardianError::from(e)
        })?;
        let block = modules.meta.block;

        let check = self.block_guard.lock().check(&block);
        let live_from_block = match check {
            BlockCheck::Process { live_from_block } => live_from_block,
            BlockCheck::AlreadyProcessed => {
                debug!(block_number = block.number, "Block already processed");
                return Ok(CycleOutcome::AlreadyProcessed {
                    block_number: block.number,
                });
            }
            BlockCheck::Stale { last_processed } => {
                log_block_event!(
                    warn,
                    "Registry block is behind the last processed block, skipping",
                    block.number,
                    block.hash,
                    last_processed = last_processed
                );
                return Ok(CycleOutcome::Stale {
                    block_number: block.number,
                    last_processed,
                });
            }
        };

        log_block_event!(info, "Guardian cycle started", block.number, block.hash);

        match self.process(block, &modules.modules, modules.meta.freshness_token, live_from_block).await {
            Ok(report) if !report.is_complete() => {
                self.block_guard.lock().mark_unfinished(live_from_block);
                log_block_event!(
                    warn,
                    "Guardian cycle incomplete, block will be retried",
                    block.number,
                    block.hash,
                    failed_modules = report.failures.len(),
                    live_from_block = live_from_block
                );
                Ok(CycleOutcome::Completed(report))
            }
            Ok(report) => {
                self.block_guard.lock().mark_processed(block);
                LAST_PROCESSED_BLOCK.set(block.number as f64);
                log_block_event!(
                    info,
                    "Guardian cycle completed",
                    block.number,
                    block.hash,
                    modules = report.reports.len()
                );
                Ok(CycleOutcome::Completed(report))
            }
            Err(e) => {
                self.block_guard.lock().mark_unfinished(live_from_block);
                log_block_event!(error, "Guardian cycle aborted", block.number, block.hash, error = %e);
                Err(e)
            }
        }
    }

    async fn process(
        &self,
        block: BlockRef,
        modules: &[StakingModule],
        freshness_token: FreshnessToken,
        live_from_block: u64,
    ) -> GuardianResult<CycleReport> {
        let module_ids: Vec<u32> = modules.iter().map(|module| module.id).collect();

        let (snapshot, keys, operators) = tokio::try_join!(
            self.collector.collect(block, &module_ids),
            self.registry.keys(freshness_token),
            try_join_all(module_ids.iter().map(|&module_id| self.registry.operators(module_id))),
        )?;

        let stolen = detect_historical_front_run(
            &keys,
            &snapshot.deposit_events,
            &snapshot.withdrawal_credentials,
        );
        let historical_front_run = !stolen.is_empty();
        if historical_front_run {
            log_block_event!(
                warn,
                "Historical front-run detected, every module will be paused",
                block.number,
                block.hash,
                stolen_keys = stolen.len()
            );
        }

        let duplicated = duplicated_pubkeys(&keys);
        let registrations = self.registry.registrations(&duplicated, block.number).await?;
        let duplicates = resolve_duplicates(&keys, &RegistrationIndex::new(registrations));
        if !duplicates.is_empty() {
            log_block_event!(
                warn,
                "Duplicated keys found",
                block.number,
                block.hash,
                resolved = duplicates.resolved.len(),
                unresolved = duplicates.unresolved.len()
            );
        }

        let data = try_join_all(modules.iter().zip(&operators).map(|(module, operators)| {
            self.module_data(
                module,
                operators,
                &keys,
                &snapshot,
                &duplicates,
                historical_front_run,
                live_from_block,
            )
        }))
        .await?;

        let (reports, failures) = self.act(&data, &snapshot).await;

        let ping_sent = self.guard.send_ping(&snapshot, module_ids).await;
        if ping_sent {
            MESSAGES_SENT.with_label_values(&["ping"]).inc();
        }

        Ok(CycleReport {
            block,
            reports,
            failures,
            ping_sent,
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn module_data(
        &self,
        module: &StakingModule,
        operators: &[NodeOperator],
        keys: &[RegistryKey],
        snapshot: &BlockSnapshot,
        duplicates: &DuplicateResolution,
        historical_front_run: bool,
        live_from_block: u64,
    ) -> GuardianResult<StakingModuleData> {
        let vetted_unused = vetted_unused_keys(&module.address, operators, keys);

        let invalid_keys = {
            let _timer = time_histogram!(KEY_VALIDATION_DURATION);
            self.validator
                .invalid_keys(&snapshot.withdrawal_credentials, &vetted_unused)
                .await?
        };

        let front_run = detect_front_run(
            &vetted_unused,
            &snapshot.deposit_events,
            &snapshot.withdrawal_credentials,
            live_from_block,
        );
        let module_duplicates = duplicates.restrict_to(&vetted_unused);

        let label = module.id.to_string();
        INVALID_KEYS.with_label_values(&[&label]).set(invalid_keys.len() as f64);
        INTERSECTIONS
            .with_label_values(&[&label, "benign"])
            .set(front_run.benign_deposits as f64);
        INTERSECTIONS
            .with_label_values(&[&label, "front_run"])
            .set(front_run.front_run_keys.len() as f64);
        DUPLICATED_KEYS
            .with_label_values(&[&label, "resolved"])
            .set(module_duplicates.resolved.len() as f64);
        DUPLICATED_KEYS
            .with_label_values(&[&label, "unresolved"])
            .set(module_duplicates.unresolved.len() as f64);

        log_module_event!(
            debug,
            "Module data collected",
            module.id,
            vetted_unused = vetted_unused.len(),
            invalid = invalid_keys.len(),
            front_run = front_run.front_run_keys.len(),
            live_front_run = front_run.live,
            duplicated = module_duplicates.resolved.len(),
            unresolved = module_duplicates.unresolved.len()
        );

        Ok(StakingModuleData {
            module_id: module.id,
            module_address: module.address,
            nonce: module.nonce,
            vetted_unused_keys: vetted_unused,
            invalid_keys,
            duplicated_keys: module_duplicates.resolved,
            unresolved_duplicated_keys: module_duplicates.unresolved,
            front_run_keys: front_run.front_run_keys,
            live_front_run: front_run.live,
            historical_front_run,
        })
    }

    async fn act(
        &self,
        data: &[StakingModuleData],
        snapshot: &BlockSnapshot,
    ) -> (Vec<GuardReport>, Vec<(u32, GuardError)>) {
        let results =
            join_all(data.iter().map(|module| self.guard.handle_module(module, snapshot))).await;

        let mut reports = Vec::with_capacity(data.len());
        let mut failures = Vec::new();
        for (module, result) in data.iter().zip(results) {
            match result {
                Ok(report) => {
                    let action = report.decision.action();
                    GUARD_ACTIONS
                        .with_label_values(&[&module.module_id.to_string(), action])
                        .inc();
                    if report.messages_sent > 0 {
                        MESSAGES_SENT
                            .with_label_values(&[action])
                            .inc_by(report.messages_sent as f64);
                    }
                    reports.push(report);
                }
                Err(e) => {
                    log_module_event!(
                        error,
                        "Module action failed",
                        module.module_id,
                        block_number = snapshot.block_number(),
                        error = %e
                    );
                    failures.push((module.module_id, e));
                }
            }
        }

        if !failures.is_empty() {
            warn!(
                block_number = snapshot.block_number(),
                failed = failures.len(),
                "Some modules were not handled this cycle"
            );
        } else {
            info!(
                block_number = snapshot.block_number(),
                modules = reports.len(),
                "All modules handled"
            );
        }
        (reports, failures)
    }
}
