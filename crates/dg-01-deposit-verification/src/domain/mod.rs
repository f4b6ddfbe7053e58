//! # Domain Layer
//!
//! Pure deposit-signature logic with no I/O dependencies.
//! This is the inner layer of the hexagonal architecture.

pub mod bls;
pub mod cache;
pub mod entities;
pub mod errors;
pub mod fork;
pub mod ssz;
