//! # Staking Module Data
//!
//! Everything the guard knows about one module for one block: the keys
//! that could receive the next deposit, and every reason not to deposit
//! into them.

use shared_types::{Address, KeyIdentity, NodeOperator, RegistryKey};
use std::collections::{BTreeMap, BTreeSet};

/// Why a module must be paused rather than unvetted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PauseReason {
    /// Duplicate keys whose original registration could not be determined
    UnresolvedDuplicates,
    /// A front-run deposit landed inside the live window
    LiveFrontRun,
    /// A past front-run deposit succeeded for a key already in use
    HistoricalFrontRun,
}

impl PauseReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            PauseReason::UnresolvedDuplicates => "unresolved_duplicates",
            PauseReason::LiveFrontRun => "live_front_run",
            PauseReason::HistoricalFrontRun => "historical_front_run",
        }
    }
}

/// Per-module findings for one block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StakingModuleData {
    pub module_id: u32,
    pub module_address: Address,
    pub nonce: u64,
    /// Keys next in line for deposits.
    pub vetted_unused_keys: Vec<RegistryKey>,
    pub invalid_keys: Vec<RegistryKey>,
    /// Resolved duplicates (the originals are excluded).
    pub duplicated_keys: Vec<RegistryKey>,
    pub unresolved_duplicated_keys: Vec<RegistryKey>,
    pub front_run_keys: Vec<RegistryKey>,
    /// Some front-run key was hit inside the live window.
    pub live_front_run: bool,
    /// Set for every module when any historical theft is found.
    pub historical_front_run: bool,
}

impl StakingModuleData {
    /// Conditions that force a pause, in priority order.
    pub fn pause_reasons(&self) -> Vec<PauseReason> {
        let mut reasons = Vec::new();
        if !self.unresolved_duplicated_keys.is_empty() {
            reasons.push(PauseReason::UnresolvedDuplicates);
        }
        if self.live_front_run {
            reasons.push(PauseReason::LiveFrontRun);
        }
        if self.historical_front_run {
            reasons.push(PauseReason::HistoricalFrontRun);
        }
        reasons
    }

    /// Union of invalid, duplicated and front-run keys, one entry per
    /// identity, sorted by identity.
    pub fn keys_for_unvetting(&self) -> Vec<RegistryKey> {
        let mut by_identity: BTreeMap<KeyIdentity, RegistryKey> = BTreeMap::new();
        for key in self
            .invalid_keys
            .iter()
            .chain(&self.duplicated_keys)
            .chain(&self.front_run_keys)
        {
            by_identity.entry(key.identity()).or_insert_with(|| key.clone());
        }
        by_identity.into_values().collect()
    }

    pub fn is_clean(&self) -> bool {
        self.pause_reasons().is_empty() && self.keys_for_unvetting().is_empty()
    }
}

/// Keys of `module_address` next in line for a deposit.
///
/// For each operator: its unused keys in that module sorted by index, the
/// first `staking_limit - used_key_count` of them, keeping only vetted ones.
pub fn vetted_unused_keys(
    module_address: &Address,
    operators: &[NodeOperator],
    keys: &[RegistryKey],
) -> Vec<RegistryKey> {
    let mut unused_by_operator: BTreeMap<u64, Vec<&RegistryKey>> = BTreeMap::new();
    let mut seen: BTreeSet<KeyIdentity> = BTreeSet::new();
    for key in keys {
        if key.module_address == *module_address && !key.used && seen.insert(key.identity()) {
            unused_by_operator.entry(key.operator_index).or_default().push(key);
        }
    }

    let mut result = Vec::new();
    for operator in operators {
        let Some(unused) = unused_by_operator.get_mut(&operator.index) else {
            continue;
        };
        unused.sort_by_key(|key| key.index);

        let window = usize::try_from(operator.vetted_window()).unwrap_or(usize::MAX);
        result.extend(
            unused
                .iter()
                .take(window)
                .filter(|key| key.vetted)
                .map(|key| (*key).clone()),
        );
    }
    result
}

#[cfg(test)]
pub(crate) mod test_utils {
    use shared_types::{Address, BlsPublicKey, RegistryKey};

    pub const MODULE_A: Address = Address([0xaa; 20]);
    pub const MODULE_B: Address = Address([0xbb; 20]);

    pub fn pubkey(seed: u8) -> BlsPublicKey {
        BlsPublicKey([seed; 48])
    }

    pub fn key(module_address: Address, operator_index: u64, index: u64, seed: u8) -> RegistryKey {
        RegistryKey {
            key: pubkey(seed),
            deposit_signature: Default::default(),
            operator_index,
            module_address,
            index,
            used: false,
            vetted: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_utils::*;
    use super::*;

    fn operator(index: u64, staking_limit: u64, used_key_count: u64) -> NodeOperator {
        NodeOperator {
            index,
            staking_limit,
            used_key_count,
        }
    }

    /// Test: The window is the next `staking_limit - used` unused keys
    #[test]
    fn test_vetted_unused_window() {
        let mut used = key(MODULE_A, 0, 0, 1);
        used.used = true;
        let keys = vec![
            key(MODULE_A, 0, 3, 4),
            used,
            key(MODULE_A, 0, 1, 2),
            key(MODULE_A, 0, 2, 3),
        ];

        let result = vetted_unused_keys(&MODULE_A, &[operator(0, 3, 1)], &keys);

        let indexes: Vec<u64> = result.iter().map(|k| k.index).collect();
        assert_eq!(indexes, vec![1, 2]);
    }

    /// Test: Unvetted keys inside the window are dropped
    #[test]
    fn test_vetted_unused_skips_unvetted() {
        let mut unvetted = key(MODULE_A, 0, 1, 2);
        unvetted.vetted = false;
        let keys = vec![key(MODULE_A, 0, 0, 1), unvetted];

        let result = vetted_unused_keys(&MODULE_A, &[operator(0, 5, 0)], &keys);

        assert_eq!(result, vec![key(MODULE_A, 0, 0, 1)]);
    }

    /// Test: Keys of other modules never leak into a module's window
    #[test]
    fn test_vetted_unused_filters_module() {
        let keys = vec![key(MODULE_B, 0, 0, 1), key(MODULE_A, 0, 0, 2)];

        let result = vetted_unused_keys(&MODULE_A, &[operator(0, 5, 0)], &keys);

        assert_eq!(result, vec![key(MODULE_A, 0, 0, 2)]);
    }

    /// Test: A used count above the limit yields an empty window
    #[test]
    fn test_vetted_unused_exhausted_operator() {
        let keys = vec![key(MODULE_A, 0, 5, 1)];
        assert!(vetted_unused_keys(&MODULE_A, &[operator(0, 2, 4)], &keys).is_empty());
    }

    #[test]
    fn test_pause_reasons_order() {
        let data = StakingModuleData {
            unresolved_duplicated_keys: vec![key(MODULE_A, 0, 0, 1)],
            historical_front_run: true,
            ..Default::default()
        };

        assert_eq!(
            data.pause_reasons(),
            vec![
                PauseReason::UnresolvedDuplicates,
                PauseReason::HistoricalFrontRun
            ]
        );
        assert!(!data.is_clean());
    }

    /// Test: A key flagged for several reasons is unvetted once
    #[test]
    fn test_keys_for_unvetting_deduplicates() {
        let flagged = key(MODULE_A, 1, 4, 9);
        let data = StakingModuleData {
            invalid_keys: vec![flagged.clone()],
            front_run_keys: vec![flagged.clone(), key(MODULE_A, 0, 2, 3)],
            ..Default::default()
        };

        let keys = data.keys_for_unvetting();

        assert_eq!(keys, vec![key(MODULE_A, 0, 2, 3), flagged]);
        assert!(data.pause_reasons().is_empty());
    }
}
