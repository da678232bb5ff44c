// [libs/domain/models/src/room.rs]
//! Room sensor state: the per-room aggregation of the latest sample
//! from each sensor family.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type RoomId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightState {
    Dark,
    Normal,
    Bright,
}

impl LightState {
    /// Derives the light state from a 0–100 level using the
    /// configured dark/bright thresholds (defaults: dark < 10,
    /// bright > 80).
    pub fn from_level(level: u8, dark_threshold: u8, bright_threshold: u8) -> Self {
        if level < dark_threshold {
            LightState::Dark
        } else if level > bright_threshold {
            LightState::Bright
        } else {
            LightState::Normal
        }
    }
}

/// Created on first message from a room; mutated by every inbound
/// sample; last-writer-wins per field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSensorState {
    pub room_id: RoomId,
    pub temperature_f: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub last_update: Option<DateTime<Utc>>,
    pub online: bool,
    pub light_level: Option<u8>,
    pub light_state: Option<LightState>,
    pub occupied: bool,
    pub last_motion_at: Option<DateTime<Utc>>,
    pub last_cleared_at: Option<DateTime<Utc>>,
}

impl RoomSensorState {
    pub fn new(room_id: impl Into<RoomId>) -> Self {
        Self {
            room_id: room_id.into(),
            temperature_f: None,
            humidity_pct: None,
            last_update: None,
            online: false,
            light_level: None,
            light_state: None,
            occupied: false,
            last_motion_at: None,
            last_cleared_at: None,
        }
    }
}
