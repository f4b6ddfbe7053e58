//! # Key Guard Subsystem (DG-03)
//!
//! Decides, per staking module and block, whether deposits are safe.
//!
//! ## Architecture
//!
//! - **Domain** (`domain/`): front-run and duplicate detection, unvetting
//!   encoding, contracts state and the decision function
//! - **Ports** (`ports/`): the `TransactionGateway` guardian wallet
//! - **Messenger** (`messenger.rs`): attribution and per-module publishing
//! - **Service** (`service.rs`): carries out the chosen action
//!
//! ## Decision Priority
//!
//! | Condition                                         | Action          |
//! |---------------------------------------------------|-----------------|
//! | Deposits already paused                           | none            |
//! | Unresolved duplicates, live or historical theft   | pause           |
//! | Invalid, duplicated or older front-run keys       | unvet           |
//! | Clean, state changed since last attestation       | deposit         |

pub mod domain;
pub mod error;
pub mod messenger;
pub mod ports;
pub mod service;

pub use domain::{
    decide, detect_front_run, detect_historical_front_run, duplicated_pubkeys,
    resolve_duplicates, unvetting_chunks, vetted_unused_keys, ContractsState,
    ContractsStateStore, DuplicateResolution, FrontRunReport, GuardDecision, PauseReason,
    RegistrationIndex, StakingModuleData, UnvetChunk, DEFAULT_RESIGN_BLOCKS,
};
pub use error::{GatewayError, GatewayResult, GuardError, GuardResult};
pub use messenger::{GuardianMessenger, SendOutcome};
pub use ports::outbound::{ContractCall, SigningPayload, TransactionGateway};
pub use service::{GuardReport, StakingModuleGuard};
