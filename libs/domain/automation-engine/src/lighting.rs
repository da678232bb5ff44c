// [libs/domain/automation-engine/src/lighting.rs]
//! Motion-activated lighting. `RuleRegistry` owns one
//! `AutomationRule` per room; the task tracks a small local mirror of
//! occupancy/light-state derived from the same `RoomEvent` broadcast
//! the thermostat control loop reads, so neither task needs to query
//! the room actor directly.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use fabric_domain_models::room::LightState;
use fabric_domain_models::rule::AutomationRule;
use fabric_domain_models::topics::device_command_topic;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::DEFAULT_AUTO_LIGHT_ROOMS;
use crate::messages::{CommandSink, OutboundCommand};
use crate::room_actor::RoomEvent;

#[derive(Default)]
pub struct RuleRegistry {
    rules: Mutex<HashMap<String, AutomationRule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The six standard rooms , each with a
    /// `light-<room>` target device and the given cooldown.
    pub fn with_default_rooms(cooldown: Duration) -> Self {
        let registry = Self::new();
        for room in DEFAULT_AUTO_LIGHT_ROOMS {
            registry.register(AutomationRule::new_motion_light(room, format!("light-{room}"), cooldown.as_secs()));
        }
        registry
    }

    pub fn register(&self, rule: AutomationRule) {
        self.rules.lock().expect("rule registry lock poisoned").insert(rule.room_id.clone(), rule);
    }

    pub fn set_enabled(&self, room_id: &str, enabled: bool) -> bool {
        let mut rules = self.rules.lock().expect("rule registry lock poisoned");
        match rules.get_mut(room_id) {
            Some(rule) => {
                rule.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> Vec<AutomationRule> {
        self.rules.lock().expect("rule registry lock poisoned").values().cloned().collect()
    }

    /// Attempts to fire the rule for `room_id`. Returns the target
    /// device id on success; `None` if there's no rule, it's
    /// disabled, or its cooldown hasn't elapsed.
    fn try_fire(&self, room_id: &str) -> Option<String> {
        let mut rules = self.rules.lock().expect("rule registry lock poisoned");
        let rule = rules.get_mut(room_id)?;
        let now = Utc::now();

        if !rule.can_fire(now) {
            return None;
        }

        rule.record_fired(now);
        Some(rule.target_device_id.clone())
    }
}

#[derive(Default, Clone, Copy)]
struct RoomLightView {
    occupied: bool,
    light_state: Option<LightState>,
}

async fn fire_turn_on(rules: &RuleRegistry, room_id: &str, sink: &dyn CommandSink) {
    let Some(target_device_id) = rules.try_fire(room_id) else {
        return;
    };

    debug!(room_id, target_device_id, "motion-lighting rule fired");

    let command = fabric_domain_models::messages::DeviceCommandMessage {
        action: fabric_domain_models::messages::DeviceCommandAction::TurnOn,
        value: serde_json::Value::Bool(true),
        options: serde_json::Map::new(),
    };

    let payload = match serde_json::to_vec(&command) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(error = %err, "failed to serialize turn_on command");
            return;
        }
    };

    if let Err(err) = sink
        .publish(OutboundCommand {
            topic: device_command_topic(&target_device_id),
            payload,
        })
        .await
    {
        warn!(error = %err, room_id, "failed to publish motion-lighting command");
    }
}

/// Runs the reactive motion-lighting evaluator ("rule
/// evaluation is purely reactive; there is no scheduled sweep").
pub async fn run_motion_lighting(rules: Arc<RuleRegistry>, mut room_events: broadcast::Receiver<RoomEvent>, sink: Arc<dyn CommandSink>, cancel: CancellationToken) {
    let mut views: HashMap<String, RoomLightView> = HashMap::new();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            event = room_events.recv() => {
                match event {
                    Ok(RoomEvent::MotionArrived { room_id }) => {
                        let view = views.entry(room_id.clone()).or_default();
                        view.occupied = true;

                        let is_dark = matches!(view.light_state, Some(LightState::Dark) | None);
                        if is_dark {
                            fire_turn_on(&rules, &room_id, sink.as_ref()).await;
                        }
                    }
                    Ok(RoomEvent::MotionCleared { room_id }) => {
                        views.entry(room_id).or_default().occupied = false;
                    }
                    Ok(RoomEvent::LightChanged { room_id, state }) => {
                        let view = views.entry(room_id.clone()).or_default();
                        view.light_state = Some(state);

                        if state == LightState::Dark && view.occupied {
                            fire_turn_on(&rules, &room_id, sink.as_ref()).await;
                        }
                    }
                    Ok(RoomEvent::TemperatureChanged { .. }) => continue,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "motion lighting lagged behind room events");
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

    fn events_channel() -> (broadcast::Sender<RoomEvent>, broadcast::Receiver<RoomEvent>) {
        broadcast::channel(16)
    }

    #[tokio::test]
    async fn motion_in_dark_room_fires_turn_on_once() {
        let rules = Arc::new(RuleRegistry::with_default_rooms(Duration::from_secs(300)));
        let (tx, rx) = events_channel();
        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel();
        let sink: Arc<dyn CommandSink> = Arc::new(RecordingSink(cmd_tx));
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(run_motion_lighting(rules, rx, sink, cancel.clone()));

        tx.send(RoomEvent::LightChanged { room_id: "kitchen".into(), state: LightState::Dark }).unwrap();
        tx.send(RoomEvent::MotionArrived { room_id: "kitchen".into() }).unwrap();

        let command = tokio::time::timeout(Duration::from_secs(1), cmd_rx.recv()).await.unwrap().unwrap();
        assert_eq!(command.topic, "device-command/light-kitchen");

        cancel.cancel();
        let _ = handle.await;
    }

    #[tokio::test]
    async fn cooldown_prevents_second_firing_within_window() {
        let rules = Arc::new(RuleRegistry::with_default_rooms(Duration::from_secs(300)));
        let (tx, rx) = events_channel();
        let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel();
        let sink: Arc<dyn CommandSink> = Arc::new(RecordingSink(cmd_tx));
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(run_motion_lighting(rules, rx, sink, cancel.clone()));

        tx.send(RoomEvent::LightChanged { room_id: "kitchen".into(), state: LightState::Dark }).unwrap();
        tx.send(RoomEvent::MotionArrived { room_id: "kitchen".into() }).unwrap();
        tx.send(RoomEvent::MotionCleared { room_id: "kitchen".into() }).unwrap();
        tx.send(RoomEvent::MotionArrived { room_id: "kitchen".into() }).unwrap();

        let _first = tokio::time::timeout(Duration::from_secs(1), cmd_rx.recv()).await.unwrap().unwrap();
        let second = tokio::time::timeout(Duration::from_millis(200), cmd_rx.recv()).await;
        assert!(second.is_err(), "cooldown should have suppressed a second firing");

        cancel.cancel();
        let _ = handle.await;
    }

    #[test]
    fn disabling_a_rule_prevents_it_from_firing() {
        let rules = RuleRegistry::with_default_rooms(Duration::from_secs(300));
        assert!(rules.set_enabled("kitchen", false));
        assert!(rules.try_fire("kitchen").is_none());
    }
}
