//! # Guard Decision
//!
//! Exactly one action per module per cycle, chosen in priority order:
//! already paused, pause, unvet, deposit. A deposit whose contracts state
//! was already signed is skipped.

use crate::domain::contracts_state::{ContractsState, ContractsStateStore};
use crate::domain::module_data::{PauseReason, StakingModuleData};
use dg_02_block_snapshot::BlockSnapshot;
use shared_types::RegistryKey;

/// Action chosen for one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Deposits are already halted; nothing to sign.
    AlreadyPaused,
    Pause { reasons: Vec<PauseReason> },
    /// Withhold deposits and lower vetted counts for `keys`.
    Unvet { keys: Vec<RegistryKey> },
    Deposit { state: ContractsState },
    /// A deposit message for this state was already signed.
    Unchanged { state: ContractsState },
}

impl GuardDecision {
    /// Label used in logs and metrics.
    pub fn action(&self) -> &'static str {
        match self {
            GuardDecision::AlreadyPaused => "already_paused",
            GuardDecision::Pause { .. } => "pause",
            GuardDecision::Unvet { .. } => "unvet",
            GuardDecision::Deposit { .. } => "deposit",
            GuardDecision::Unchanged { .. } => "unchanged",
        }
    }
}

/// Choose the action for `data` at `snapshot`.
pub fn decide(
    data: &StakingModuleData,
    snapshot: &BlockSnapshot,
    store: &ContractsStateStore,
    resign_blocks: u64,
) -> GuardDecision {
    if snapshot.is_module_paused(data.module_id) {
        return GuardDecision::AlreadyPaused;
    }

    let reasons = data.pause_reasons();
    if !reasons.is_empty() {
        return GuardDecision::Pause { reasons };
    }

    let keys = data.keys_for_unvetting();
    if !keys.is_empty() {
        return GuardDecision::Unvet { keys };
    }

    let state = ContractsState {
        nonce: data.nonce,
        deposit_root: snapshot.deposit_root,
        block_number: snapshot.block_number(),
    };
    if store.is_unchanged(data.module_id, &state, resign_blocks) {
        GuardDecision::Unchanged { state }
    } else {
        GuardDecision::Deposit { state }
    }
}


#[cfg(test)]
mod tests {
    use super::test_utils::snapshot;
    use super::*;
    use crate::domain::contracts_state::DEFAULT_RESIGN_BLOCKS;
    use crate::domain::module_data::test_utils::{key, MODULE_A};

    fn clean(module_id: u32) -> StakingModuleData {
        StakingModuleData {
            module_id,
            module_address: MODULE_A,
            nonce: 4,
            vetted_unused_keys: vec![key(MODULE_A, 0, 0, 1)],
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_module_deposits() {
        let decision = decide(&clean(1), &snapshot(100), &ContractsStateStore::new(), 50);

        assert_eq!(
            decision,
            GuardDecision::Deposit {
                state: ContractsState {
                    nonce: 4,
                    deposit_root: [0x0d; 32].into(),
                    block_number: 100
                }
            }
        );
    }

    /// Test: A paused module takes no action even with pause reasons
    #[test]
    fn test_already_paused_wins() {
        let mut data = clean(1);
        data.live_front_run = true;
        let mut snap = snapshot(100);
        snap.paused_modules.insert(1);

        assert_eq!(
            decide(&data, &snap, &ContractsStateStore::new(), 50),
            GuardDecision::AlreadyPaused
        );
    }

    /// Test: Pause reasons take priority over unvetting
    #[test]
    fn test_pause_before_unvet() {
        let mut data = clean(1);
        data.invalid_keys = vec![key(MODULE_A, 0, 0, 1)];
        data.unresolved_duplicated_keys = vec![key(MODULE_A, 0, 1, 2)];

        let decision = decide(&data, &snapshot(100), &ContractsStateStore::new(), 50);

        assert_eq!(
            decision,
            GuardDecision::Pause {
                reasons: vec![PauseReason::UnresolvedDuplicates]
            }
        );
    }

    /// Test: Non-live front-run keys are unvetted, not paused
    #[test]
    fn test_old_front_run_unvets() {
        let mut data = clean(1);
        data.front_run_keys = vec![key(MODULE_A, 0, 0, 1)];

        let decision = decide(&data, &snapshot(100), &ContractsStateStore::new(), 50);

        assert_eq!(decision.action(), "unvet");
    }

    /// Test: The same state is signed at most once per bucket
    #[test]
    fn test_unchanged_state_not_resigned() {
        let store = ContractsStateStore::new();
        let GuardDecision::Deposit { state } =
            decide(&clean(1), &snapshot(100), &store, DEFAULT_RESIGN_BLOCKS)
        else {
            panic!("expected deposit");
        };
        store.set(1, state);

        assert_eq!(
            decide(&clean(1), &snapshot(101), &store, DEFAULT_RESIGN_BLOCKS).action(),
            "unchanged"
        );
        assert_eq!(
            decide(&clean(1), &snapshot(150), &store, DEFAULT_RESIGN_BLOCKS).action(),
            "deposit"
        );
    }
}
