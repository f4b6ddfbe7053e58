//! # Deposit Verification Subsystem (DG-01)
//!
//! Verifies the BLS deposit signatures of registry keys.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): SSZ merkleization, signing domains, BLS
//!   verification and the validation cache; no I/O
//! - **Pool** (`pool.rs`): fixed-size worker pool with static partitioning
//! - **Ports Layer** (`ports/`): the `KeyValidationApi` trait
//! - **Service Layer** (`service.rs`): wires cache and pool behind the port
//!
//! ## Security Notes
//!
//! - **Fail-closed**: malformed keys or signatures are invalid, never errors
//! - **Network binding**: the signing domain is fixed at startup from the
//!   chain id; an unknown chain id is a fatal error

pub mod domain;
pub mod pool;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::bls::{verify_bls, DepositSignatureVerifier, DEPOSIT_AMOUNT_GWEI};
pub use domain::cache::{ValidationCache, ValidationCacheEntry};
pub use domain::entities::{DepositMessage, Domain, ForkVersion};
pub use domain::errors::{ValidationError, ValidationResult};
pub use domain::fork::{deposit_domain, genesis_fork_version};
pub use pool::{partition, VerificationPool};
pub use ports::inbound::KeyValidationApi;
pub use service::KeyValidationService;
