//! # Shared Bus - Guardian Message Bus
//!
//! Carries signed guardian messages (ping, deposit, unvet, pause) from the
//! decision core to whatever transport delivers them to the guardian set.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │  Key Guard   │                    │  Recipients  │
//! │              │    publish()       │  (council,   │
//! │              │ ──────┐            │   bots)      │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │ Message Bus  │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod messages;
pub mod publisher;

// Re-export main types
pub use messages::{
    AppMeta, DepositMessage, GuardianMessage, MessageBody, PauseMessage, PingMessage,
    UnvetMessage,
};
pub use publisher::{Envelope, InMemoryMessageBus, MessagePublisher, PublishError};

/// Maximum messages to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Topic a guardian publishes to for the given network name.
pub fn topic_for_network(network: &str) -> String {
    format!("{network}-defender")
}
