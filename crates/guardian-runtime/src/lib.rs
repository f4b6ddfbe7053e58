//! # Guardian Runtime
//!
//! Wires the deposit guardian together and drives it block by block.
//!
//! ## Modules
//!
//! - `config`: environment configuration
//! - `startup`: network and registry version checks run once at startup
//! - `cycle`: the per-block `GuardianCycle`
//! - `adapters`: fixture-backed readers and the local wallet for dry runs
//!
//! ## Startup Sequence
//!
//! 1. Telemetry, then `GuardianConfig::from_env`
//! 2. Registry status: chain id selects the deposit domain, the registry
//!    major version must match (both fatal)
//! 3. Subsystems: key validation pool, snapshot collector, key guard
//! 4. Poll loop: one cycle per tick until Ctrl+C

pub mod adapters;
pub mod config;
pub mod cycle;
pub mod error;
pub mod startup;

pub use adapters::{Fixture, FixtureAdapter, LocalWallet, MessagePrefixes};
pub use config::{ConfigError, GuardianConfig};
pub use cycle::{CycleOutcome, CycleReport, GuardianCycle};
pub use error::{GuardianError, GuardianResult};
pub use startup::{check_registry_version, major_version, verify_network};

/// Application name attached to every guardian message.
pub const APP_NAME: &str = "deposit-guardian";
