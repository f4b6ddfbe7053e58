//! # Ports Layer
//!
//! Trait definitions for the inbound interface of this subsystem.

pub mod inbound;
