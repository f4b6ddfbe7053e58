//! # Adapters
//!
//! Port implementations that run the guardian without external services:
//!
//! - `FixtureAdapter`: registry, chain, wallet monitor and signing key
//!   events served from a JSON fixture
//! - `LocalWallet`: in-process secp256k1 signer whose transactions are
//!   recorded instead of broadcast

pub mod fixture;
pub mod local_signer;

pub use fixture::{Fixture, FixtureAdapter};
pub use local_signer::{keccak256, LocalWallet, MessagePrefixes};
