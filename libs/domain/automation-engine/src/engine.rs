// [libs/domain/automation-engine/src/engine.rs]
//! The engine's public surface: subscribe to the four sensor topic
//! families, fan inbound messages out to per-room actors, and run the
//! thermostat control loop, the motion-lighting evaluator, and the
//! offline janitor as independent cooperative tasks sharing one
//! `RoomEvent` broadcast and one cancellation token — the same
//! multi-task-per-component shape `fabric-infra-discovery::DiscoveryNode`
//! uses for its receive loop, janitor, and timers.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use fabric_domain_models::topics::{ROOM_HUM_PREFIX, ROOM_LIGHT_PREFIX, ROOM_MOTION_PREFIX, ROOM_TEMP_PREFIX};
use fabric_shared_errors::FabricError;

use crate::config::EngineConfig;
use crate::dispatch::{parse_room_humidity, parse_room_light, parse_room_motion, parse_room_temp};
use crate::janitor::run_engine_janitor;
use crate::lighting::{run_motion_lighting, RuleRegistry};
use crate::messages::{CommandSink, InboundMessage, SensorSource};
use crate::room_actor::RoomEvent;
use crate::room_registry::RoomRegistry;
use crate::thermostat_control::run_thermostat_control;
use crate::thermostat_registry::ThermostatRegistry;

/// Marks a room offline if no motion sample has arrived in this
/// window. Distinct from `EngineConfig::auto_off_delay`, which gates
/// the (optional, unimplemented-by-default) light auto-off re-check.
const ROOM_OFFLINE_IDLE_WINDOW: chrono::Duration = chrono::Duration::minutes(10);

pub struct AutomationEngine {
    config: EngineConfig,
    rooms: Arc<RoomRegistry>,
    thermostats: Arc<ThermostatRegistry>,
    rules: Arc<RuleRegistry>,
    room_events: broadcast::Sender<RoomEvent>,
    cancel: CancellationToken,
    tasks: tokio::sync::Mutex<JoinSet<()>>,
}

impl AutomationEngine {
    pub fn new(config: EngineConfig) -> Self {
        let (room_events, _) = broadcast::channel(256);
        let rules = RuleRegistry::with_default_rooms(config.motion_light_cooldown);

        Self {
            rooms: RoomRegistry::new(room_events.clone()),
            thermostats: Arc::new(ThermostatRegistry::new()),
            rules: Arc::new(rules),
            room_events,
            config,
            cancel: CancellationToken::new(),
            tasks: tokio::sync::Mutex::new(JoinSet::new()),
        }
    }

    pub fn thermostats(&self) -> Arc<ThermostatRegistry> {
        self.thermostats.clone()
    }

    pub fn rules(&self) -> Arc<RuleRegistry> {
        self.rules.clone()
    }

    pub fn rooms(&self) -> Arc<RoomRegistry> {
        self.rooms.clone()
    }

    /// Subscribes to the four sensor topic families, then spawns the
    /// dispatch loops, the thermostat control loop, the motion-lighting
    /// evaluator, and the offline janitor.
    pub async fn start(&self, sensors: Arc<dyn SensorSource>, commands: Arc<dyn CommandSink>) -> Result<(), FabricError> {
        let mut tasks = self.tasks.lock().await;

        let temp_rx = sensors.subscribe(&format!("{ROOM_TEMP_PREFIX}#")).await?;
        let hum_rx = sensors.subscribe(&format!("{ROOM_HUM_PREFIX}#")).await?;
        let motion_rx = sensors.subscribe(&format!("{ROOM_MOTION_PREFIX}#")).await?;
        let light_rx = sensors.subscribe(&format!("{ROOM_LIGHT_PREFIX}#")).await?;

        tasks.spawn(Self::run_dispatch_loop(self.rooms.clone(), temp_rx, self.cancel.clone(), parse_room_temp_adapter));
        tasks.spawn(Self::run_dispatch_loop(self.rooms.clone(), hum_rx, self.cancel.clone(), parse_room_humidity_adapter));
        tasks.spawn(Self::run_dispatch_loop(self.rooms.clone(), motion_rx, self.cancel.clone(), parse_room_motion_adapter));

        let dark = self.config.dark_threshold;
        let bright = self.config.bright_threshold;
        let light_rooms = self.rooms.clone();
        let light_cancel = self.cancel.clone();
        tasks.spawn(async move {
            Self::run_dispatch_loop(light_rooms, light_rx, light_cancel, move |payload| parse_room_light(payload, dark, bright)).await;
        });

        tasks.spawn(run_thermostat_control(
            self.thermostats.clone(),
            self.room_events.subscribe(),
            commands.clone(),
            self.cancel.clone(),
        ));

        tasks.spawn(run_motion_lighting(self.rules.clone(), self.room_events.subscribe(), commands.clone(), self.cancel.clone()));

        tasks.spawn(run_engine_janitor(self.rooms.clone(), ROOM_OFFLINE_IDLE_WINDOW, self.cancel.clone()));

        info!("automation engine started");
        Ok(())
    }

    async fn run_dispatch_loop(
        rooms: Arc<RoomRegistry>,
        mut inbound: tokio::sync::mpsc::Receiver<InboundMessage>,
        cancel: CancellationToken,
        parse: impl Fn(&[u8]) -> Option<(String, crate::room_actor::RoomCommand)>,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                message = inbound.recv() => {
                    let Some(message) = message else { break };
                    let Some((room_id, command)) = parse(&message.payload) else { continue };

                    let sender = rooms.sender_for(&room_id).await;
                    if sender.send(command).await.is_err() {
                        warn!(room_id, "room actor command channel closed mid-dispatch");
                    }
                }
            }
        }
    }

    /// Idempotent: cancels the shared token and awaits every task,
    /// then tears down the per-room actors.
    pub async fn stop(&self) {
        self.cancel.cancel();

        let mut tasks = self.tasks.lock().await;
        while tasks.join_next().await.is_some() {}

        self.rooms.shutdown().await;
    }
}

fn parse_room_temp_adapter(payload: &[u8]) -> Option<(String, crate::room_actor::RoomCommand)> {
    parse_room_temp(payload)
}

fn parse_room_humidity_adapter(payload: &[u8]) -> Option<(String, crate::room_actor::RoomCommand)> {
    parse_room_humidity(payload)
}

fn parse_room_motion_adapter(payload: &[u8]) -> Option<(String, crate::room_actor::RoomCommand)> {
    parse_room_motion(payload)
}
