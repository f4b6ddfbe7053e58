//! # Front-Run Detection
//!
//! A front-run is a deposit for a registry key made with withdrawal
//! credentials other than the protocol's, racing the protocol's own deposit
//! so that the first (and binding) deposit pays out to the attacker.
//!
//! Two views are computed:
//! - **Per module**: vetted-unused keys that already have a foreign deposit.
//!   Hits inside the live window pause the module; older hits only unvet.
//! - **Historical**: keys the registry already marks used whose first valid
//!   deposit was foreign. Any such key pauses every module.

use shared_types::{BlsPublicKey, DepositEvent, RegistryKey, WithdrawalCredentials};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// Result of intersecting a module's keys with deposit history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontRunReport {
    /// Keys with at least one valid foreign-credential deposit.
    pub front_run_keys: Vec<RegistryKey>,
    /// Valid deposits that used the protocol's credentials.
    pub benign_deposits: usize,
    /// Some foreign deposit lies in the live window.
    pub live: bool,
}

fn events_by_pubkey(events: &[DepositEvent]) -> HashMap<BlsPublicKey, Vec<&DepositEvent>> {
    let mut index: HashMap<BlsPublicKey, Vec<&DepositEvent>> = HashMap::new();
    for event in events.iter().filter(|event| event.valid) {
        index.entry(event.pubkey).or_default().push(event);
    }
    index
}

/// Intersect `keys` with deposit `events`.
///
/// Events with an invalid signature are ignored: the deposit contract
/// accepted them but the beacon chain will not.
pub fn detect_front_run(
    keys: &[RegistryKey],
    events: &[DepositEvent],
    protocol_credentials: &WithdrawalCredentials,
    live_from_block: u64,
) -> FrontRunReport {
    let index = events_by_pubkey(events);
    let mut report = FrontRunReport::default();

    for key in keys {
        let Some(deposits) = index.get(&key.key) else {
            continue;
        };

        let mut front_run = false;
        for event in deposits {
            if event.withdrawal_credentials == *protocol_credentials {
                report.benign_deposits += 1;
                debug!(
                    pubkey = %key.key,
                    block_number = event.block_number,
                    "Deposit with protocol credentials for unused key"
                );
                continue;
            }

            front_run = true;
            if event.block_number >= live_from_block {
                report.live = true;
            }
            warn!(
                pubkey = %key.key,
                operator_index = key.operator_index,
                key_index = key.index,
                withdrawal_credentials = %event.withdrawal_credentials,
                block_number = event.block_number,
                tx_hash = %event.tx_hash,
                "Front-run deposit detected"
            );
        }

        if front_run {
            report.front_run_keys.push(key.clone());
        }
    }

    report
}

/// Public keys whose first valid deposit was made with foreign credentials
/// even though the protocol has since deposited them.
///
/// Only keys the registry marks used count, so a deposit the protocol never
/// made cannot trigger a global pause. Ordering is by `(block, log index)`.
pub fn detect_historical_front_run(
    keys: &[RegistryKey],
    events: &[DepositEvent],
    protocol_credentials: &WithdrawalCredentials,
) -> Vec<BlsPublicKey> {
    let used: BTreeSet<BlsPublicKey> = keys.iter().filter(|k| k.used).map(|k| k.key).collect();
    let mut stolen = Vec::new();

    for (pubkey, deposits) in events_by_pubkey(events) {
        if !used.contains(&pubkey) {
            continue;
        }

        let (protocol, foreign): (Vec<&DepositEvent>, Vec<&DepositEvent>) = deposits
            .into_iter()
            .partition(|event| event.withdrawal_credentials == *protocol_credentials);

        let first_protocol = protocol.iter().map(|e| e.position()).min();
        let first_foreign = foreign.iter().min_by_key(|e| e.position());

        if let (Some(protocol_at), Some(theft)) = (first_protocol, first_foreign) {
            if theft.position() < protocol_at {
                warn!(
                    pubkey = %pubkey,
                    withdrawal_credentials = %theft.withdrawal_credentials,
                    block_number = theft.block_number,
                    tx_hash = %theft.tx_hash,
                    "Historical front-run of a used key"
                );
                stolen.push(pubkey);
            }
        }
    }

    stolen.sort();
    stolen
}
