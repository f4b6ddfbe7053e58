//! # Guardian Messenger
//!
//! Attributes message bodies to this guardian and publishes them. Sends
//! for one module are serialized; sends for different modules proceed
//! concurrently. Publishing is fire-and-forget: a transport failure is
//! logged and the cycle carries on.

use dg_02_block_snapshot::BlockSnapshot;
use parking_lot::Mutex;
use shared_bus::{AppMeta, GuardianMessage, MessageBody, MessagePublisher};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, error, warn};

/// What happened to one message handed to the messenger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Accepted by the transport.
    Sent,
    /// This guardian has no index in the guardian set; nothing was published.
    NotInGuardianSet,
    /// The transport rejected the message.
    PublishFailed,
}

impl SendOutcome {
    pub fn is_sent(self) -> bool {
        self == SendOutcome::Sent
    }
}

/// Publishes guardian messages for one network topic.
pub struct GuardianMessenger<P: MessagePublisher> {
    publisher: Arc<P>,
    topic: String,
    app: AppMeta,
    send_locks: Mutex<HashMap<Option<u32>, Arc<AsyncMutex<()>>>>,
}

impl<P: MessagePublisher> GuardianMessenger<P> {
    pub fn new(publisher: Arc<P>, topic: impl Into<String>, app: AppMeta) -> Self {
        Self {
            publisher,
            topic: topic.into(),
            app,
            send_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    fn send_lock(&self, module_id: Option<u32>) -> Arc<AsyncMutex<()>> {
        Arc::clone(self.send_locks.lock().entry(module_id).or_default())
    }

    /// Publish `body` as this guardian at `snapshot`.
    ///
    /// A guardian outside the guardian set never publishes.
    pub async fn send(&self, snapshot: &BlockSnapshot, body: MessageBody) -> SendOutcome {
        let kind = body.kind();
        let Some(guardian_index) = snapshot.guardian_index else {
            warn!(
                kind = kind,
                guardian_address = %snapshot.guardian_address,
                block_number = snapshot.block_number(),
                "Guardian is not in the guardian set, message not sent"
            );
            return SendOutcome::NotInGuardianSet;
        };

        let lock = self.send_lock(body.staking_module_id());
        let _guard = lock.lock().await;

        let message = GuardianMessage {
            guardian_address: snapshot.guardian_address,
            guardian_index,
            app: self.app.clone(),
            body,
        };

        match self.publisher.publish(&self.topic, message).await {
            Ok(()) => {
                debug!(kind = kind, topic = %self.topic, "Guardian message sent");
                SendOutcome::Sent
            }
            Err(e) => {
                error!(kind = kind, topic = %self.topic, error = %e, "Failed to publish guardian message");
                SendOutcome::PublishFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::decision::test_utils::snapshot;
    use shared_bus::{InMemoryMessageBus, PingMessage};

    fn messenger(bus: Arc<InMemoryMessageBus>) -> GuardianMessenger<InMemoryMessageBus> {
        GuardianMessenger::new(
            bus,
            "holesky-defender",
            AppMeta {
                name: "deposit-guardian".to_string(),
                version: "0.1.0".to_string(),
            },
        )
    }

    fn ping() -> MessageBody {
        MessageBody::Ping(PingMessage {
            block_number: 10,
            staking_module_ids: vec![1],
        })
    }

    #[tokio::test]
    async fn test_send_attributes_guardian() {
        let bus = Arc::new(InMemoryMessageBus::new());
        let mut sub = bus.subscribe();
        let messenger = messenger(Arc::clone(&bus));

        let mut snap = snapshot(10);
        snap.guardian_index = Some(4);
        assert_eq!(messenger.send(&snap, ping()).await, SendOutcome::Sent);

        let envelope = sub.recv().await.unwrap();
        assert_eq!(envelope.topic, "holesky-defender");
        assert_eq!(envelope.message.guardian_index, 4);
        assert_eq!(envelope.message.guardian_address, snap.guardian_address);
    }

    /// Test: A guardian without an index publishes nothing
    #[tokio::test]
    async fn test_no_guardian_index_no_send() {
        let bus = Arc::new(InMemoryMessageBus::new());
        let messenger = messenger(Arc::clone(&bus));

        let mut snap = snapshot(10);
        snap.guardian_index = None;

        assert_eq!(
            messenger.send(&snap, ping()).await,
            SendOutcome::NotInGuardianSet
        );
        assert_eq!(bus.messages_published(), 0);
    }

    /// Test: Concurrent sends for one module all go out
    #[tokio::test]
    async fn test_concurrent_sends_same_module() {
        let bus = Arc::new(InMemoryMessageBus::new());
        let messenger = Arc::new(messenger(Arc::clone(&bus)));
        let snap = snapshot(10);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let messenger = Arc::clone(&messenger);
                let snap = snap.clone();
                tokio::spawn(async move { messenger.send(&snap, ping()).await })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap().is_sent());
        }

        assert_eq!(bus.messages_published(), 8);
    }
}
