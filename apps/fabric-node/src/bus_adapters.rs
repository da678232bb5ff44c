// [apps/fabric-node/src/bus_adapters.rs]
//! Adapts one shared `fabric_infra_bus::MessageBus` onto the three
//! narrow traits the domain-layer crates define at their own
//! boundaries (`SensorSource`/`CommandSink` in the automation engine,
//! `ReadingSink` in the polling service) rather than depending on the
//! bus crate directly — the same seam `messages.rs` documents.

use std::sync::Arc;

use async_trait::async_trait;
use fabric_domain_automation_engine::{CommandSink, InboundMessage, OutboundCommand, SensorSource};
use fabric_domain_models::device::EnergyReading;
use fabric_domain_models::topics::tapo_energy_topic;
use fabric_infra_bus::{MessageBus, Qos};
use fabric_infra_polling::ReadingSink;
use fabric_shared_errors::FabricError;
use tokio::sync::mpsc;

pub struct BusSensorSource {
    bus: Arc<dyn MessageBus>,
}

impl BusSensorSource {
    pub fn new(bus: Arc<dyn MessageBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl SensorSource for BusSensorSource {
    async fn subscribe(&self, topic_filter: &str) -> Result<mpsc::Receiver<InboundMessage>, FabricError> {
        let mut bus_rx = self.bus.subscribe(topic_filter).await?;
        let (tx, rx) = mpsc::channel(100);

        tokio::spawn(async move {
            while let Some(message) = bus_rx.recv().await {
                let forwarded = InboundMessage {
                    topic: message.topic,
                    payload: message.payload,
                };
                if tx.send(forwarded).await.is_err() {
                    break;
                }
            }
        });

        Ok(rx)
    }
}

pub struct BusCommandSink {
    bus: Arc<dyn MessageBus>,
}

impl BusCommandSink {
    pub fn new(bus: Arc<dyn MessageBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl CommandSink for BusCommandSink {
    async fn publish(&self, command: OutboundCommand) -> Result<(), FabricError> {
        self.bus.publish(&command.topic, command.payload, Qos::AtLeastOnce, false).await
    }
}

/// Publishes polling-service readings to `tapo/<device-id>/energy`,
/// QoS 1, non-retained.
pub struct BusReadingSink {
    bus: Arc<dyn MessageBus>,
}

impl BusReadingSink {
    pub fn new(bus: Arc<dyn MessageBus>) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl ReadingSink for BusReadingSink {
    async fn publish_reading(&self, reading: &EnergyReading) -> Result<(), FabricError> {
        let topic = tapo_energy_topic(&reading.device_id);
        let payload = serde_json::to_vec(reading).map_err(|err| FabricError::service(format!("serializing energy reading: {err}")))?;
        self.bus.publish(&topic, payload, Qos::AtLeastOnce, false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fabric_infra_bus::InMemoryBus;

    fn sample_reading() -> EnergyReading {
        EnergyReading {
            device_id: "plug-1".into(),
            device_name: "Kitchen Plug".into(),
            room_id: "kitchen".into(),
            power_w: 42.0,
            energy_wh: 120.0,
            is_on: true,
            signal_strength: -50,
            timestamp: Utc::now().timestamp(),
        }
    }

    #[tokio::test]
    async fn reading_sink_publishes_to_per_device_energy_topic() {
        let bus: Arc<dyn MessageBus> = Arc::new(InMemoryBus::default());
        let mut rx = bus.subscribe("tapo/plug-1/energy").await.unwrap();

        let sink = BusReadingSink::new(bus);
        sink.publish_reading(&sample_reading()).await.unwrap();

        let message = rx.recv().await.unwrap();
        assert_eq!(message.topic, "tapo/plug-1/energy");
    }

    #[tokio::test]
    async fn command_sink_publishes_verbatim_topic() {
        let bus: Arc<dyn MessageBus> = Arc::new(InMemoryBus::default());
        let mut rx = bus.subscribe("room-control/kitchen").await.unwrap();

        let sink = BusCommandSink::new(bus);
        sink.publish(OutboundCommand {
            topic: "room-control/kitchen".into(),
            payload: b"{}".to_vec(),
        })
        .await
        .unwrap();

        assert_eq!(rx.recv().await.unwrap().topic, "room-control/kitchen");
    }

    #[tokio::test]
    async fn sensor_source_forwards_matching_messages() {
        let bus: Arc<dyn MessageBus> = Arc::new(InMemoryBus::default());
        let source = BusSensorSource::new(bus.clone());

        let mut rx = source.subscribe("room-temp/#").await.unwrap();
        bus.publish("room-temp/kitchen", b"{}".to_vec(), Qos::AtLeastOnce, false).await.unwrap();

        let message = rx.recv().await.unwrap();
        assert_eq!(message.topic, "room-temp/kitchen");
    }
}
