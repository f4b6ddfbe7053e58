//! Domain layer for the key guard: detectors and the decision function.
//! Pure computation; signing and publishing live in the service.

pub mod contracts_state;
pub mod decision;
pub mod duplicates;
pub mod front_run;
pub mod module_data;
pub mod unvetting;

pub use contracts_state::{ContractsState, ContractsStateStore, DEFAULT_RESIGN_BLOCKS};
pub use decision::{decide, GuardDecision};
pub use duplicates::{
    duplicate_groups, duplicated_pubkeys, resolve_duplicates, DuplicateResolution,
    RegistrationIndex,
};
pub use front_run::{detect_front_run, detect_historical_front_run, FrontRunReport};
pub use module_data::{vetted_unused_keys, PauseReason, StakingModuleData};
pub use unvetting::{
    pack, unpack, unvetting_chunks, unvetting_targets, OperatorUnvetting, UnvetChunk,
    OPERATOR_ID_BYTES, VETTED_COUNT_BYTES,
};
