//! # Message Publisher
//!
//! Defines the publishing side of the guardian message bus.

use crate::messages::GuardianMessage;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Errors returned by a message transport.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PublishError {
    /// The transport refused or failed to accept the message.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The message could not be encoded for the transport.
    #[error("Encoding error: {0}")]
    Encoding(String),
}

/// Trait for publishing signed guardian messages.
///
/// Delivery is fire-and-forget with at-least-once semantics; message shapes
/// are idempotent so recipients tolerate duplicates.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Publish a message to a topic.
    async fn publish(&self, topic: &str, message: GuardianMessage) -> Result<(), PublishError>;

    /// Get the total number of messages published.
    fn messages_published(&self) -> u64;
}

/// A message as seen by a bus subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub topic: String,
    pub message: GuardianMessage,
}

/// In-memory implementation of the message bus.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer semantics.
/// Used for dry runs and tests; a networked transport implements the same
/// trait.
pub struct InMemoryMessageBus {
    sender: broadcast::Sender<Envelope>,
    messages_published: AtomicU64,
    capacity: usize,
}

impl InMemoryMessageBus {
    /// Create a new in-memory bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            messages_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Subscribe to every message published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the channel capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryMessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePublisher for InMemoryMessageBus {
    async fn publish(&self, topic: &str, message: GuardianMessage) -> Result<(), PublishError> {
        let kind = message.kind();
        self.messages_published.fetch_add(1, Ordering::Relaxed);

        let envelope = Envelope {
            topic: topic.to_string(),
            message,
        };

        match self.sender.send(envelope) {
            Ok(receiver_count) => {
                debug!(
                    topic = topic,
                    kind = kind,
                    receivers = receiver_count,
                    "Message published"
                );
            }
            Err(_) => {
                // No receivers - message is dropped
                warn!(topic = topic, kind = kind, "Message dropped (no receivers)");
            }
        }
        Ok(())
    }

    fn messages_published(&self) -> u64 {
        self.messages_published.load(Ordering::Relaxed)
    }
}
