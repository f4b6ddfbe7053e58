//! # Block Snapshot
//!
//! One consistent view of block-scoped facts. Built once per cycle and
//! shared read-only by every detector, so all decisions in a cycle reason
//! about the same block.

use shared_types::{Address, BlockRef, DepositEvent, Hash, WithdrawalCredentials};
use std::collections::BTreeSet;

/// First security contract version with per-module pause messages.
pub const PAUSE_MECHANISM_V3: u32 = 3;

/// Facts read at one block hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSnapshot {
    pub block: BlockRef,
    pub deposit_root: Hash,
    pub guardian_address: Address,
    /// `None` when this guardian is not in the guardian set.
    pub guardian_index: Option<u32>,
    pub withdrawal_credentials: WithdrawalCredentials,
    /// Deposits paused for every module.
    pub deposits_paused: bool,
    pub paused_modules: BTreeSet<u32>,
    pub security_version: u32,
    pub max_operators_per_unvetting: u64,
    pub wallet_balance_critical: bool,
    /// All deposit events up to and including `block`, in chain order.
    pub deposit_events: Vec<DepositEvent>,
}

impl BlockSnapshot {
    pub fn block_number(&self) -> u64 {
        self.block.number
    }

    pub fn block_hash(&self) -> Hash {
        self.block.hash
    }

    /// Deposits into this module are already halted.
    pub fn is_module_paused(&self, module_id: u32) -> bool {
        self.deposits_paused || self.paused_modules.contains(&module_id)
    }

    /// The security contract predates per-module pause messages, so a
    /// pause must also be sent on-chain.
    pub fn uses_legacy_pause(&self) -> bool {
        self.security_version < PAUSE_MECHANISM_V3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> BlockSnapshot {
        BlockSnapshot {
            block: BlockRef {
                number: 10,
                hash: Hash::ZERO,
            },
            deposit_root: Hash::ZERO,
            guardian_address: Address::ZERO,
            guardian_index: Some(0),
            withdrawal_credentials: WithdrawalCredentials::ZERO,
            deposits_paused: false,
            paused_modules: BTreeSet::from([2]),
            security_version: 3,
            max_operators_per_unvetting: 200,
            wallet_balance_critical: false,
            deposit_events: Vec::new(),
        }
    }

    #[test]
    fn test_module_pause_flags() {
        let mut snap = snapshot();
        assert!(!snap.is_module_paused(1));
        assert!(snap.is_module_paused(2));

        snap.deposits_paused = true;
        assert!(snap.is_module_paused(1));
    }

    #[test]
    fn test_legacy_pause_by_version() {
        let mut snap = snapshot();
        assert!(!snap.uses_legacy_pause());
        snap.security_version = 2;
        assert!(snap.uses_legacy_pause());
    }
}
