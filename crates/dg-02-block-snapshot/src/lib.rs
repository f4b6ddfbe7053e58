//! # Block Snapshot Subsystem (DG-02)
//!
//! Consistent reads of chain and registry state for one guardian cycle.
//!
//! ## Architecture
//!
//! - **Domain** (`domain/`): `BlockSnapshot`, `ConsistencyCache`, `BlockGuard`
//! - **Ports** (`ports/`): registry, chain, wallet and signing-key readers
//! - **Service** (`service.rs`): concurrent, time-bounded collection
//!
//! ## Invariants
//!
//! - Every fact in a `BlockSnapshot` is read at the same block hash
//! - A collection either returns every fact or an error, never a partial view
//! - A key list is only returned under the freshness token the caller expects

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use domain::{BlockCheck, BlockGuard, BlockSnapshot, ConsistencyCache, PAUSE_MECHANISM_V3};
pub use error::{SnapshotError, SnapshotResult};
pub use ports::outbound::{
    ChainReader, KeyList, ModuleList, RegistryReader, RegistryStatus, SigningKeyEventSource,
    WalletMonitor,
};
pub use service::{bounded, BlockSnapshotCollector, RegistryService, SnapshotConfig};
