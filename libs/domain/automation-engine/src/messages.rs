// [libs/domain/automation-engine/src/messages.rs]
//! The engine's boundary with the outside message bus. Kept as small
//! plain structs and traits, rather than a direct dependency on
//! `fabric-infra-bus`, so this crate stays domain-layer: a binding
//! crate (the node binary) adapts a real `MessageBus` to
//! `SensorSource`/`CommandSink` the same way `fabric-infra-polling`
//! keeps its own `ReadingSink` trait instead of depending on the bus
//! crate directly.

use async_trait::async_trait;
use fabric_shared_errors::FabricError;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct OutboundCommand {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Subscribes the engine to inbound sensor topics. The canonical
/// binding forwards `room-temp/#`, `room-hum/#`, `room-motion/#`, and
/// `room-light/#` from a real message bus.
#[async_trait]
pub trait SensorSource: Send + Sync {
    async fn subscribe(&self, topic_filter: &str) -> Result<mpsc::Receiver<InboundMessage>, FabricError>;
}

/// Publishes engine-originated commands (`room-control/<room>`,
/// per-device command topics).
#[async_trait]
pub trait CommandSink: Send + Sync {
    async fn publish(&self, command: OutboundCommand) -> Result<(), FabricError>;
}
