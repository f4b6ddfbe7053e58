//! # Contracts State
//!
//! The last state a deposit attestation was signed for, per module. A new
//! deposit message is only signed when the module nonce or deposit root
//! changed, or the block moved into a new resign bucket.

use parking_lot::Mutex;
use shared_types::Hash;
use std::collections::HashMap;

/// Blocks per resign bucket unless configured otherwise.
pub const DEFAULT_RESIGN_BLOCKS: u64 = 50;

/// State a deposit attestation covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractsState {
    pub nonce: u64,
    pub deposit_root: Hash,
    pub block_number: u64,
}

impl ContractsState {
    /// Equal nonce, equal root and the same `block_number / resign_blocks`.
    pub fn is_same(&self, other: &ContractsState, resign_blocks: u64) -> bool {
        let bucket = resign_blocks.max(1);
        self.nonce == other.nonce
            && self.deposit_root == other.deposit_root
            && self.block_number / bucket == other.block_number / bucket
    }
}

/// Last signed state per staking module.
#[derive(Debug, Default)]
pub struct ContractsStateStore {
    states: Mutex<HashMap<u32, ContractsState>>,
}

impl ContractsStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, module_id: u32) -> Option<ContractsState> {
        self.states.lock().get(&module_id).copied()
    }

    pub fn set(&self, module_id: u32, state: ContractsState) {
        self.states.lock().insert(module_id, state);
    }

    /// A deposit message for `state` was already signed.
    pub fn is_unchanged(&self, module_id: u32, state: &ContractsState, resign_blocks: u64) -> bool {
        self.get(module_id)
            .is_some_and(|last| last.is_same(state, resign_blocks))
    }
}
