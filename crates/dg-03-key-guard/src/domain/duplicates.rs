//! # Duplicate Key Resolution
//!
//! The same public key registered under more than one identity can only be
//! deposited once. One registration is the original; the rest must be
//! unvetted. When the original cannot be told apart, the whole set is
//! unresolved and the module must pause instead.
//!
//! Resolution order for one duplicate set:
//! 1. One operator holds every copy: its lowest index is the original.
//! 2. Some copy is already used: every unused copy is a duplicate.
//! 3. Registration events decide: the operator that registered the key in
//!    the strictly earliest block owns the original. A missing event or a
//!    tie in the earliest block leaves the set unresolved.

use shared_types::{Address, BlsPublicKey, KeyIdentity, RegistryKey, SigningKeyEvent};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, warn};

/// Registration events indexed by public key.
#[derive(Debug, Clone, Default)]
pub struct RegistrationIndex {
    by_key: HashMap<BlsPublicKey, Vec<SigningKeyEvent>>,
}

impl RegistrationIndex {
    pub fn new(events: impl IntoIterator<Item = SigningKeyEvent>) -> Self {
        let mut by_key: HashMap<BlsPublicKey, Vec<SigningKeyEvent>> = HashMap::new();
        for event in events {
            by_key.entry(event.key).or_default().push(event);
        }
        Self { by_key }
    }

    pub fn events_for(&self, key: &BlsPublicKey) -> &[SigningKeyEvent] {
        self.by_key.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Earliest block in which `operator` registered `key`.
    fn first_registration(&self, key: &BlsPublicKey, operator: &(Address, u64)) -> Option<u64> {
        self.events_for(key)
            .iter()
            .filter(|e| (e.module_address, e.operator_index) == *operator)
            .map(|e| e.block_number)
            .min()
    }
}

/// Duplicate keys split by whether an original could be determined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateResolution {
    /// Copies that must be unvetted; originals are not listed.
    pub resolved: Vec<RegistryKey>,
    /// Every copy of each set whose original is unknown.
    pub unresolved: Vec<RegistryKey>,
}

impl DuplicateResolution {
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty() && self.unresolved.is_empty()
    }

    /// Restrict both lists to the identities present in `keys`.
    pub fn restrict_to(&self, keys: &[RegistryKey]) -> DuplicateResolution {
        let allowed: BTreeSet<KeyIdentity> = keys.iter().map(RegistryKey::identity).collect();
        let keep = |list: &[RegistryKey]| -> Vec<RegistryKey> {
            list.iter()
                .filter(|key| allowed.contains(&key.identity()))
                .cloned()
                .collect()
        };
        DuplicateResolution {
            resolved: keep(&self.resolved),
            unresolved: keep(&self.unresolved),
        }
    }
}

/// Group keys by public key, keeping only keys with more than one distinct
/// identity. Each group is sorted by identity.
pub fn duplicate_groups(keys: &[RegistryKey]) -> BTreeMap<BlsPublicKey, Vec<RegistryKey>> {
    let mut groups: BTreeMap<BlsPublicKey, Vec<RegistryKey>> = BTreeMap::new();
    for key in keys {
        groups.entry(key.key).or_default().push(key.clone());
    }

    groups.retain(|_, group| {
        // A used entry wins over a stale unused copy of the same identity
        group.sort_by(|a, b| a.identity().cmp(&b.identity()).then(b.used.cmp(&a.used)));
        group.dedup_by_key(|key| key.identity());
        group.len() > 1
    });
    groups
}

/// Public keys that appear under more than one identity.
pub fn duplicated_pubkeys(keys: &[RegistryKey]) -> Vec<BlsPublicKey> {
    duplicate_groups(keys).into_keys().collect()
}

enum GroupOutcome {
    Duplicates(Vec<RegistryKey>),
    Unresolved,
}

fn operator_of(key: &RegistryKey) -> (Address, u64) {
    (key.module_address, key.operator_index)
}

/// Copies other than the lowest-index key of `owner`. `group` is sorted by
/// identity so the first match is the lowest index.
fn all_but_first_of(group: &[RegistryKey], owner: &(Address, u64)) -> Vec<RegistryKey> {
    let original = group.iter().position(|key| operator_of(key) == *owner);
    group
        .iter()
        .enumerate()
        .filter(|(position, _)| Some(*position) != original)
        .map(|(_, key)| key.clone())
        .collect()
}

fn resolve_group(
    pubkey: &BlsPublicKey,
    group: &[RegistryKey],
    registrations: &RegistrationIndex,
) -> GroupOutcome {
    let operators: BTreeSet<(Address, u64)> = group.iter().map(operator_of).collect();

    if operators.len() == 1 {
        let owner = operator_of(&group[0]);
        return GroupOutcome::Duplicates(all_but_first_of(group, &owner));
    }

    if group.iter().any(|key| key.used) {
        return GroupOutcome::Duplicates(group.iter().filter(|k| !k.used).cloned().collect());
    }

    let mut first_blocks = Vec::with_capacity(operators.len());
    for operator in &operators {
        match registrations.first_registration(pubkey, operator) {
            Some(block) => first_blocks.push((block, *operator)),
            None => {
                warn!(
                    pubkey = %pubkey,
                    module_address = %operator.0,
                    operator_index = operator.1,
                    "Missing registration event for duplicated key"
                );
                return GroupOutcome::Unresolved;
            }
        }
    }

    let earliest = first_blocks.iter().map(|(block, _)| *block).min();
    let mut winners = first_blocks.iter().filter(|(block, _)| Some(*block) == earliest);
    match (winners.next(), winners.next()) {
        (Some((block, owner)), None) => {
            debug!(
                pubkey = %pubkey,
                module_address = %owner.0,
                operator_index = owner.1,
                block_number = block,
                "Original registration found"
            );
            GroupOutcome::Duplicates(all_but_first_of(group, owner))
        }
        _ => {
            warn!(
                pubkey = %pubkey,
                block_number = earliest.unwrap_or_default(),
                "Several operators registered duplicated key in the same block"
            );
            GroupOutcome::Unresolved
        }
    }
}

/// Resolve every duplicate set in `keys`.
///
/// The output is sorted by identity and does not depend on input order.
pub fn resolve_duplicates(
    keys: &[RegistryKey],
    registrations: &RegistrationIndex,
) -> DuplicateResolution {
    let mut resolution = DuplicateResolution::default();

    for (pubkey, group) in duplicate_groups(keys) {
        match resolve_group(&pubkey, &group, registrations) {
            GroupOutcome::Duplicates(duplicates) => resolution.resolved.extend(duplicates),
            GroupOutcome::Unresolved => resolution.unresolved.extend(group),
        }
    }

    resolution.resolved.sort_by_key(RegistryKey::identity);
    resolution.unresolved.sort_by_key(RegistryKey::identity);
    resolution
}
