// [libs/infra/bus/src/memory.rs]
//! In-process `MessageBus` binding backed by `tokio::sync::broadcast`.
//! Every subscriber gets its own task that filters the shared
//! broadcast stream down to the topics it asked for and forwards
//! matches through an `mpsc` channel — this keeps the public
//! `subscribe` return type a plain `Receiver<BusMessage>` regardless
//! of binding, so callers never see a broadcast lag error.

use async_trait::async_trait;
use fabric_shared_errors::FabricError;
use tokio::sync::{broadcast, mpsc};

use crate::{topic_matches, BusMessage, MessageBus, Qos};

pub struct InMemoryBus {
    sender: broadcast::Sender<BusMessage>,
}

impl InMemoryBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl MessageBus for InMemoryBus {
    async fn publish(&self, topic: &str, payload: Vec<u8>, _qos: Qos, _retain: bool) -> Result<(), FabricError> {
        // A broadcast send fails only when there are zero receivers, which
        // is a benign no-op for a pub/sub bus, not an error condition.
        let _ = self.sender.send(BusMessage {
            topic: topic.to_string(),
            payload,
        });
        Ok(())
    }

    async fn subscribe(&self, topic_filter: &str) -> Result<mpsc::Receiver<BusMessage>, FabricError> {
        let mut broadcast_rx = self.sender.subscribe();
        let (forward_tx, forward_rx) = mpsc::channel(64);
        let filter = topic_filter.to_string();

        tokio::spawn(async move {
            loop {
                match broadcast_rx.recv().await {
                    Ok(message) => {
                        if topic_matches(&filter, &message.topic) && forward_tx.send(message).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, filter = %filter, "bus subscriber lagged, dropped messages");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Ok(forward_rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn multiple_subscribers_each_receive_matching_messages() {
        let bus = InMemoryBus::new(32);
        let mut kitchen_rx = bus.subscribe("room-temp/kitchen").await.unwrap();
        let mut all_rx = bus.subscribe("room-temp/#").await.unwrap();

        bus.publish("room-temp/kitchen", b"1".to_vec(), Qos::AtLeastOnce, false)
            .await
            .unwrap();

        assert_eq!(kitchen_rx.recv().await.unwrap().payload, b"1".to_vec());
        assert_eq!(all_rx.recv().await.unwrap().payload, b"1".to_vec());
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_is_not_an_error() {
        let bus = InMemoryBus::new(8);
        let result = bus.publish("tapo/plug-1/energy", b"{}".to_vec(), Qos::AtLeastOnce, false).await;
        assert!(result.is_ok());
    }
}
