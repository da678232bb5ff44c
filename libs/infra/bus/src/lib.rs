// [libs/infra/bus/src/lib.rs]
/*!
 * =================================================================
 * APARATO: MESSAGE BUS ABSTRACTION
 * CLASIFICACION: INFRASTRUCTURE (ESTRATO L3)
 * RESPONSABILIDAD: DESACOPLAR EL NUCLEO DEL BROKER EXTERNO
 *
 * The broker implementation is explicitly out of scope —
 * the fabric is a *client* of a pub/sub broker, not the broker
 * itself. This crate is the seam: a `MessageBus` trait both the
 * polling service and the automation engine publish/subscribe
 * through, with two bindings —
 *   - `memory`: an in-process `tokio::sync::broadcast` bus, the
 *     default, used by tests and by any deployment that doesn't need
 *     a real broker.
 *   - `mqtt` (feature-gated): a real MQTT client (`rumqttc`), grounded
 *     in the way the `robotica-rust` reference project wires its own
 *     `rumqttc::AsyncClient` — topic/QoS/retain passed through
 *     unchanged.
 * =================================================================
 */

mod memory;
#[cfg(feature = "mqtt")]
mod mqtt;
mod topic_match;

pub use memory::InMemoryBus;
#[cfg(feature = "mqtt")]
pub use mqtt::{MqttBus, MqttBusConfig};
pub use topic_match::topic_matches;

use async_trait::async_trait;
use fabric_shared_errors::FabricError;

/// Quality of service, mirrored from MQTT's QoS levels. Every
/// contract in this crate uses QoS 1, non-retained; the type still
/// models 0/2 so a binding can expose them if a future topic needs
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qos {
    AtMostOnce,
    AtLeastOnce,
    ExactlyOnce,
}

#[derive(Debug, Clone)]
pub struct BusMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Abstract pub/sub sink/source. Implementors must be safe to share
/// across every poller and room actor concurrently — publish/subscribe
/// are the only suspension points a caller needs to reason about.
#[async_trait]
pub trait MessageBus: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>, qos: Qos, retain: bool) -> Result<(), FabricError>;

    /// Subscribes to a topic filter (supports MQTT-style `+` and
    /// trailing `#` wildcards — see `topic_matches`). Returns a
    /// receiver of every future message whose topic matches.
    async fn subscribe(&self, topic_filter: &str) -> Result<tokio::sync::mpsc::Receiver<BusMessage>, FabricError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_bus_delivers_to_matching_subscriber() {
        let bus = InMemoryBus::new(100);
        let mut rx = bus.subscribe("room-temp/kitchen").await.expect("subscribe");

        bus.publish("room-temp/kitchen", b"{}".to_vec(), Qos::AtLeastOnce, false)
            .await
            .expect("publish");

        let received = rx.recv().await.expect("message");
        assert_eq!(received.topic, "room-temp/kitchen");
    }

    #[tokio::test]
    async fn in_memory_bus_does_not_deliver_to_non_matching_subscriber() {
        let bus = InMemoryBus::new(100);
        let mut rx = bus.subscribe("room-temp/bedroom").await.expect("subscribe");

        bus.publish("room-temp/kitchen", b"{}".to_vec(), Qos::AtLeastOnce, false)
            .await
            .expect("publish");

        // give the broadcast fan-out a moment, then confirm nothing arrived
        let result = tokio::time::timeout(std::time::Duration::from_millis(50), rx.recv()).await;
        assert!(result.is_err(), "expected timeout, no message should match");
    }
}
