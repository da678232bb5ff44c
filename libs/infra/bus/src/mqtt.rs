// [libs/infra/bus/src/mqtt.rs]
//! Canonical `MessageBus` binding backed by a real MQTT broker
//! (`rumqttc`), grounded in the way the `robotica-rust` reference
//! project drives its own `rumqttc::AsyncClient` + `EventLoop` pair: a
//! background task pumps `EventLoop::poll()` and re-publishes every
//! inbound `Publish` packet onto an internal broadcast so any number
//! of local `subscribe` callers can filter it independently, without
//! each holding a broker-side subscription of their own.

use std::time::Duration;

use async_trait::async_trait;
use fabric_shared_errors::FabricError;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tokio::sync::{broadcast, mpsc};

use crate::{topic_matches, BusMessage, MessageBus, Qos};

#[derive(Debug, Clone)]
pub struct MqttBusConfig {
    pub client_id: String,
    pub host: String,
    pub port: u16,
    pub keep_alive: Duration,
}

impl Default for MqttBusConfig {
    fn default() -> Self {
        Self {
            client_id: "fabric-node".to_string(),
            host: "localhost".to_string(),
            port: 1883,
            keep_alive: Duration::from_secs(30),
        }
    }
}

fn to_rumqttc_qos(qos: Qos) -> QoS {
    match qos {
        Qos::AtMostOnce => QoS::AtMostOnce,
        Qos::AtLeastOnce => QoS::AtLeastOnce,
        Qos::ExactlyOnce => QoS::ExactlyOnce,
    }
}

/// Subscribes to `#` at construction time so every published topic
/// reaches the internal fan-out regardless of which local callers have
/// subscribed yet — filtering happens client-side per `subscribe`.
pub struct MqttBus {
    client: AsyncClient,
    inbound: broadcast::Sender<BusMessage>,
}

impl MqttBus {
    pub async fn connect(config: MqttBusConfig) -> Result<Self, FabricError> {
        let mut options = MqttOptions::new(config.client_id, config.host, config.port);
        options.set_keep_alive(config.keep_alive);

        let (client, mut event_loop) = AsyncClient::new(options, 64);
        let (inbound, _) = broadcast::channel(256);
        let inbound_for_task = inbound.clone();

        client
            .subscribe("#", QoS::AtLeastOnce)
            .await
            .map_err(|err| FabricError::connection(format!("mqtt initial subscribe failed: {err}")))?;

        tokio::spawn(async move {
            loop {
                match event_loop.poll().await {
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        let message = BusMessage {
                            topic: publish.topic,
                            payload: publish.payload.to_vec(),
                        };
                        let _ = inbound_for_task.send(message);
                    }
                    Ok(_) => continue,
                    Err(err) => {
                        tracing::warn!(error = %err, "mqtt event loop error, retrying");
                        tokio::time::sleep(Duration::from_millis(500)).await;
                    }
                }
            }
        });

        Ok(Self { client, inbound })
    }
}

#[async_trait]
impl MessageBus for MqttBus {
    async fn publish(&self, topic: &str, payload: Vec<u8>, qos: Qos, retain: bool) -> Result<(), FabricError> {
        self.client
            .publish(topic, to_rumqttc_qos(qos), retain, payload)
            .await
            .map_err(|err| FabricError::connection(format!("mqtt publish to {topic} failed: {err}")))
    }

    async fn subscribe(&self, topic_filter: &str) -> Result<mpsc::Receiver<BusMessage>, FabricError> {
        let mut broadcast_rx = self.inbound.subscribe();
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
                        tracing::warn!(skipped, filter = %filter, "mqtt subscriber lagged, dropped messages");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Ok(forward_rx)
    }
}
