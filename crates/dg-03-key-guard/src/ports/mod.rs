//! Ports for the key guard.

pub mod outbound;
