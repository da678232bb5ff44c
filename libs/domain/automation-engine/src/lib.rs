// [libs/domain/automation-engine/src/lib.rs]
//! Sensor-fusion automation: per-room actors fed by the four sensor
//! topic families, a thermostat hysteresis control loop, and a
//! cooldown-gated motion-lighting rule set. `AutomationEngine` is the
//! crate's single entry point; everything else is reachable through it
//! or through the registries it exposes.

mod config;
mod dispatch;
mod engine;
mod janitor;
mod lighting;
mod messages;
mod room_actor;
mod room_registry;
mod thermostat_control;
mod thermostat_registry;

pub use config::{EngineConfig, DEFAULT_AUTO_LIGHT_ROOMS};
pub use dispatch::{parse_room_humidity, parse_room_light, parse_room_motion, parse_room_temp};
pub use engine::AutomationEngine;
pub use janitor::run_engine_janitor;
pub use lighting::{run_motion_lighting, RuleRegistry};
pub use messages::{CommandSink, InboundMessage, OutboundCommand, SensorSource};
pub use room_actor::{RoomCommand, RoomEvent};
pub use room_registry::RoomRegistry;
pub use thermostat_control::run_thermostat_control;
pub use thermostat_registry::ThermostatRegistry;
