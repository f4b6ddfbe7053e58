//! # Staking Module Guard
//!
//! Application service that turns a module's findings into its one action
//! for the cycle: decides, signs through the `TransactionGateway`, publishes
//! through the `GuardianMessenger` and records signed deposit states.
//!
//! Under the current pause mechanism the pause message names no module, so
//! it is signed and published once per block however many modules ask for it.

use crate::domain::contracts_state::ContractsStateStore;
use crate::domain::decision::{decide, GuardDecision};
use crate::domain::module_data::{PauseReason, StakingModuleData};
use crate::domain::unvetting::unvetting_chunks;
use crate::error::GuardResult;
use crate::messenger::{GuardianMessenger, SendOutcome};
use crate::ports::outbound::{ContractCall, SigningPayload, TransactionGateway};
use dg_02_block_snapshot::BlockSnapshot;
use shared_bus::{
    DepositMessage, MessageBody, MessagePublisher, PauseMessage, PingMessage, UnvetMessage,
};
use shared_types::{Hash, RegistryKey};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error, info, warn};

/// What the guard did for one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardReport {
    pub module_id: u32,
    pub decision: GuardDecision,
    pub messages_sent: usize,
    pub calls_submitted: usize,
}

impl GuardReport {
    fn new(module_id: u32, decision: GuardDecision) -> Self {
        Self {
            module_id,
            decision,
            messages_sent: 0,
            calls_submitted: 0,
        }
    }
}

/// Staking Module Guard.
///
/// Owns the contracts state store for the lifetime of the process.
pub struct StakingModuleGuard<G: TransactionGateway, P: MessagePublisher> {
    gateway: Arc<G>,
    messenger: GuardianMessenger<P>,
    states: ContractsStateStore,
    resign_blocks: u64,
    /// Block hash whose module-less pause was already handled.
    global_pause: AsyncMutex<Option<Hash>>,
}

impl<G: TransactionGateway, P: MessagePublisher> StakingModuleGuard<G, P> {
    pub fn new(gateway: Arc<G>, messenger: GuardianMessenger<P>, resign_blocks: u64) -> Self {
        Self {
            gateway,
            messenger,
            states: ContractsStateStore::new(),
            resign_blocks,
            global_pause: AsyncMutex::new(None),
        }
    }

    pub fn states(&self) -> &ContractsStateStore {
        &self.states
    }

    pub fn messenger(&self) -> &GuardianMessenger<P> {
        &self.messenger
    }

    /// Decide and carry out this cycle's action for one module.
    ///
    /// # Errors
    /// * `Gateway` if an attestation could not be signed
    /// * `InvalidChunkSize` if unvetting is needed but the contract limit is zero
    pub async fn handle_module(
        &self,
        data: &StakingModuleData,
        snapshot: &BlockSnapshot,
    ) -> GuardResult<GuardReport> {
        let decision = decide(data, snapshot, &self.states, self.resign_blocks);
        let mut report = GuardReport::new(data.module_id, decision.clone());

        match decision {
            GuardDecision::AlreadyPaused => {
                info!(
                    module_id = data.module_id,
                    block_number = snapshot.block_number(),
                    "Deposits are paused, no action"
                );
            }
            GuardDecision::Pause { reasons } => {
                self.pause(data, snapshot, &reasons, &mut report).await?;
            }
            GuardDecision::Unvet { keys } => {
                self.unvet(data, snapshot, &keys, &mut report).await?;
            }
            GuardDecision::Deposit { state } => {
                let payload = SigningPayload::Deposit {
                    deposit_root: state.deposit_root,
                    nonce: state.nonce,
                    block_number: state.block_number,
                    block_hash: snapshot.block_hash(),
                    staking_module_id: data.module_id,
                };
                let signature = self.gateway.sign(&payload).await?;
                let body = MessageBody::Deposit(DepositMessage {
                    block_number: state.block_number,
                    block_hash: snapshot.block_hash(),
                    deposit_root: state.deposit_root,
                    staking_module_id: data.module_id,
                    nonce: state.nonce,
                    signature,
                });
                let outcome = self.messenger.send(snapshot, body).await;
                if outcome == SendOutcome::PublishFailed {
                    warn!(
                        module_id = data.module_id,
                        nonce = state.nonce,
                        block_number = state.block_number,
                        "Deposit attestation not delivered, state left for the next cycle"
                    );
                    return Ok(report);
                }
                if outcome.is_sent() {
                    report.messages_sent += 1;
                }
                self.states.set(data.module_id, state);
                info!(
                    module_id = data.module_id,
                    nonce = state.nonce,
                    deposit_root = %state.deposit_root,
                    block_number = state.block_number,
                    "Deposit attestation signed"
                );
            }
            GuardDecision::Unchanged { .. } => {
                info!(
                    module_id = data.module_id,
                    block_number = snapshot.block_number(),
                    "Contracts state unchanged, deposit attestation still valid"
                );
            }
        }

        Ok(report)
    }

    async fn pause(
        &self,
        data: &StakingModuleData,
        snapshot: &BlockSnapshot,
        reasons: &[PauseReason],
        report: &mut GuardReport,
    ) -> GuardResult<()> {
        let legacy = snapshot.uses_legacy_pause();
        let mut global_pause = if legacy {
            None
        } else {
            let handled = self.global_pause.lock().await;
            if *handled == Some(snapshot.block_hash()) {
                debug!(
                    module_id = data.module_id,
                    block_number = snapshot.block_number(),
                    "Pause for this block already sent"
                );
                return Ok(());
            }
            Some(handled)
        };

        let reason_names: Vec<&str> = reasons.iter().map(PauseReason::as_str).collect();
        let front_run: Vec<String> = data.front_run_keys.iter().map(|k| k.key.to_string()).collect();
        let unresolved: Vec<String> = data
            .unresolved_duplicated_keys
            .iter()
            .map(|k| k.identity().to_string())
            .collect();
        warn!(
            module_id = data.module_id,
            block_number = snapshot.block_number(),
            block_hash = %snapshot.block_hash(),
            reasons = ?reason_names,
            front_run_keys = ?front_run,
            unresolved_duplicates = ?unresolved,
            legacy_pause = legacy,
            "Pausing deposits"
        );

        // The current mechanism pauses every module with one message
        let staking_module_id = legacy.then_some(data.module_id);
        let signature = self
            .gateway
            .sign(&SigningPayload::Pause {
                block_number: snapshot.block_number(),
                block_hash: snapshot.block_hash(),
                staking_module_id,
            })
            .await?;

        if legacy {
            let call = ContractCall::PauseModule {
                block_number: snapshot.block_number(),
                staking_module_id: data.module_id,
                signature,
            };
            self.submit(call, data.module_id, report).await;
        }

        let body = MessageBody::Pause(PauseMessage {
            block_number: snapshot.block_number(),
            block_hash: snapshot.block_hash(),
            staking_module_id,
            signature,
        });
        let outcome = self.messenger.send(snapshot, body).await;
        if outcome.is_sent() {
            report.messages_sent += 1;
        }
        if let Some(handled) = global_pause.as_mut() {
            if outcome != SendOutcome::PublishFailed {
                **handled = Some(snapshot.block_hash());
            }
        }
        Ok(())
    }

    async fn unvet(
        &self,
        data: &StakingModuleData,
        snapshot: &BlockSnapshot,
        keys: &[RegistryKey],
        report: &mut GuardReport,
    ) -> GuardResult<()> {
        let chunks = unvetting_chunks(keys, snapshot.max_operators_per_unvetting)?;
        info!(
            module_id = data.module_id,
            block_number = snapshot.block_number(),
            invalid = data.invalid_keys.len(),
            duplicated = data.duplicated_keys.len(),
            front_run = data.front_run_keys.len(),
            chunks = chunks.len(),
            "Unvetting keys"
        );

        for chunk in chunks {
            let signature = self
                .gateway
                .sign(&SigningPayload::Unvet {
                    nonce: data.nonce,
                    block_number: snapshot.block_number(),
                    block_hash: snapshot.block_hash(),
                    staking_module_id: data.module_id,
                    operator_ids: chunk.operator_ids.clone(),
                    vetted_keys_by_operator: chunk.vetted_keys_by_operator.clone(),
                })
                .await?;

            if snapshot.wallet_balance_critical {
                warn!(
                    module_id = data.module_id,
                    operator_ids = %chunk.operator_ids,
                    "Wallet balance critical, skipping unvet transaction"
                );
            } else {
                let call = ContractCall::Unvet {
                    block_number: snapshot.block_number(),
                    block_hash: snapshot.block_hash(),
                    staking_module_id: data.module_id,
                    nonce: data.nonce,
                    operator_ids: chunk.operator_ids.clone(),
                    vetted_keys_by_operator: chunk.vetted_keys_by_operator.clone(),
                    signature,
                };
                self.submit(call, data.module_id, report).await;
            }

            let body = MessageBody::Unvet(UnvetMessage {
                block_number: snapshot.block_number(),
                block_hash: snapshot.block_hash(),
                staking_module_id: data.module_id,
                nonce: data.nonce,
                operator_ids: chunk.operator_ids,
                vetted_keys_by_operator: chunk.vetted_keys_by_operator,
                signature,
            });
            if self.messenger.send(snapshot, body).await.is_sent() {
                report.messages_sent += 1;
            }
        }
        Ok(())
    }

    async fn submit(&self, call: ContractCall, module_id: u32, report: &mut GuardReport) {
        let name = call.name();
        match self.gateway.submit(call).await {
            Ok(()) => report.calls_submitted += 1,
            Err(e) => {
                error!(module_id = module_id, call = name, error = %e, "Transaction submission failed");
            }
        }
    }

    /// Liveness ping for a processed block.
    pub async fn send_ping(&self, snapshot: &BlockSnapshot, staking_module_ids: Vec<u32>) -> bool {
        let body = MessageBody::Ping(PingMessage {
            block_number: snapshot.block_number(),
            staking_module_ids,
        });
        self.messenger.send(snapshot, body).await.is_sent()
    }
}
