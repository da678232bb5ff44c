// [libs/domain/automation-engine/src/thermostat_control.rs]
//! The thermostat control loop: a tick runs every 30
//! seconds AND after every temperature update for the matching room.
//! Both paths funnel through `evaluate_room`, which is the only place
//! `next_thermostat_status` is called — keeping the pure transition
//! function's caller to exactly one site means there is no risk of
//! the periodic and reactive paths disagreeing about how a status
//! change is computed.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use fabric_domain_models::thermostat::{next_thermostat_status, ThermostatStatus};
use fabric_domain_models::topics::room_control_topic;
use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::messages::{CommandSink, OutboundCommand};
use crate::room_actor::RoomEvent;
use crate::thermostat_registry::ThermostatRegistry;

const CONTROL_TICK_INTERVAL: Duration = Duration::from_secs(30);

fn status_action(status: ThermostatStatus) -> &'static str {
    match status {
        ThermostatStatus::Idle => "idle",
        ThermostatStatus::Heating => "heating",
        ThermostatStatus::Cooling => "cooling",
        ThermostatStatus::Fan => "fan",
    }
}

/// Evaluates every thermostat in `room_id` against `current_f`,
/// publishing a `room-control/<room>` command for each one whose
/// status actually changes ("no command is published if
/// status is unchanged").
async fn evaluate_room(registry: &ThermostatRegistry, room_id: &str, current_f: f64, sink: &dyn CommandSink) {
    for thermostat in registry.for_room(room_id) {
        let next = next_thermostat_status(thermostat.mode, thermostat.status, current_f, thermostat.target_f, thermostat.hysteresis_f);

        if next == thermostat.status {
            continue;
        }

        registry.set_status(&thermostat.id, next);
        debug!(thermostat_id = %thermostat.id, room_id, ?next, "thermostat status changed");

        let command = fabric_domain_models::messages::RoomControlMessage {
            action: status_action(next).to_string(),
            target_f: thermostat.target_f,
            reason: format!(
                "{:?} mode: {current_f:.1}F vs target {:.1}F (hysteresis {:.1}F)",
                thermostat.mode, thermostat.target_f, thermostat.hysteresis_f
            ),
            ts: Utc::now().timestamp(),
        };

        let payload = match serde_json::to_vec(&command) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(error = %err, "failed to serialize room-control command");
                continue;
            }
        };

        if let Err(err) = sink
            .publish(OutboundCommand {
                topic: room_control_topic(room_id),
                payload,
            })
            .await
        {
            warn!(error = %err, room_id, "failed to publish thermostat command");
        }
    }
}

/// Runs the 30s periodic tick plus the reactive temperature-update
/// path, both driven by the same `RoomEvent` broadcast the room actors
/// emit (per-room actor notifications drive the control loop
/// instead of a bespoke polling sweep).
pub async fn run_thermostat_control(
    registry: Arc<ThermostatRegistry>,
    mut room_events: broadcast::Receiver<RoomEvent>,
    sink: Arc<dyn CommandSink>,
    cancel: CancellationToken,
) {
    let latest_temps: Mutex<HashMap<String, f64>> = Mutex::new(HashMap::new());
    let mut tick = tokio::time::interval(CONTROL_TICK_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tick.tick() => {
                let snapshot: Vec<(String, f64)> = latest_temps.lock().await.iter().map(|(k, v)| (k.clone(), *v)).collect();
                for (room_id, current_f) in snapshot {
                    evaluate_room(&registry, &room_id, current_f, sink.as_ref()).await;
                }
            }
            event = room_events.recv() => {
                match event {
                    Ok(RoomEvent::TemperatureChanged { room_id, current_f }) => {
                        latest_temps.lock().await.insert(room_id.clone(), current_f);
                        evaluate_room(&registry, &room_id, current_f, sink.as_ref()).await;
                    }
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "thermostat control lagged behind room events");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use fabric_domain_models::thermostat::{ThermostatConfig, ThermostatMode};
    use fabric_shared_errors::FabricError;
    use tokio::sync::mpsc;

    struct RecordingSink(mpsc::UnboundedSender<OutboundCommand>);

    #[async_trait]
    impl CommandSink for RecordingSink {
        async fn publish(&self, command: OutboundCommand) -> Result<(), FabricError> {
            let _ = self.0.send(command);
            Ok(())
        }
    }

    /// Scenario 1  target 70, hysteresis 1, mode heat.
    /// Temperature trace 70.0, 69.8, 69.4, 70.0, 70.1 should publish
    /// exactly one "heating" and one "idle" command, in that order.
    #[tokio::test]
    async fn heating_scenario_publishes_exactly_two_commands() {
        let registry = Arc::new(ThermostatRegistry::new());
        let mut thermostat = ThermostatConfig::new("t1", "1");
        thermostat.mode = ThermostatMode::Heat;
        thermostat.target_f = 70.0;
        thermostat.hysteresis_f = 1.0;
        registry.register(thermostat);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = RecordingSink(tx);

        for current in [70.0, 69.8, 69.4, 70.0, 70.1] {
            evaluate_room(&registry, "1", current, &sink).await;
        }
        drop(sink);

        let mut received = Vec::new();
        while let Some(command) = rx.recv().await {
            let parsed: serde_json::Value = serde_json::from_slice(&command.payload).unwrap();
            received.push(parsed["action"].as_str().unwrap().to_string());
        }

        assert_eq!(received, vec!["heating".to_string(), "idle".to_string()]);
    }

    #[tokio::test]
    async fn unchanged_status_publishes_nothing() {
        let registry = Arc::new(ThermostatRegistry::new());
        registry.register(ThermostatConfig::new("t1", "kitchen"));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = RecordingSink(tx);

        // off mode, current far from target: status stays Idle -> Idle
        evaluate_room(&registry, "kitchen", 40.0, &sink).await;
        drop(sink);

        assert!(rx.recv().await.is_none());
    }
}
