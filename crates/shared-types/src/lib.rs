//! # Shared Types Crate
//!
//! Domain entities and error types shared by every guardian subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: registry keys, deposit events and block
//!   references are defined once here and passed by value between crates.
//! - **Hex on the wire**: all fixed-width byte values serialize as
//!   `0x`-prefixed lowercase hex strings.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
