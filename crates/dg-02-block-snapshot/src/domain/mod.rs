//! Domain layer for block snapshots: pure types and state, no I/O.

pub mod block_guard;
pub mod consistency;
pub mod snapshot;

pub use block_guard::{BlockCheck, BlockGuard};
pub use consistency::ConsistencyCache;
pub use snapshot::{BlockSnapshot, PAUSE_MECHANISM_V3};
