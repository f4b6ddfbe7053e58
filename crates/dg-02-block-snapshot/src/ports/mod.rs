//! Hexagonal ports for the Block Snapshot subsystem.

pub mod outbound;
