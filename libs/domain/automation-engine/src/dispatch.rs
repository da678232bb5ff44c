// [libs/domain/automation-engine/src/dispatch.rs]
//! Translates inbound bus messages on the four sensor topic families
//! into `RoomCommand`s for the matching room actor. Kept as free
//! functions operating on plain bytes — no bus
//! dependency — so the parsing/validation logic is unit-testable
//! without a running subscription, the same separation
//! `fabric-infra-discovery::node::process_inbound` keeps from its
//! socket.

use chrono::{DateTime, Utc};
use fabric_domain_models::messages::{RoomHumidityMessage, RoomLightMessage, RoomMotionMessage, RoomTempMessage};
use tracing::debug;

use crate::room_actor::RoomCommand;

fn timestamp_to_utc(epoch_secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(epoch_secs, 0).unwrap_or_else(Utc::now)
}

/// Parses a `room-temp/<room>` payload. Returns `None` on malformed
/// JSON — the caller drops the message and continues (
/// "single-message parse failures in discovery/engine: drop that
/// message, continue").
pub fn parse_room_temp(payload: &[u8]) -> Option<(String, RoomCommand)> {
    let message: RoomTempMessage = match serde_json::from_slice(payload) {
        Ok(message) => message,
        Err(err) => {
            debug!(error = %err, "dropping malformed room-temp payload");
            return None;
        }
    };

    Some((
        message.room,
        RoomCommand::ApplyTemperature {
            temperature_f: message.temperature,
            humidity_pct: message.humidity,
            at: timestamp_to_utc(message.timestamp),
        },
    ))
}

pub fn parse_room_humidity(payload: &[u8]) -> Option<(String, RoomCommand)> {
    let message: RoomHumidityMessage = match serde_json::from_slice(payload) {
        Ok(message) => message,
        Err(err) => {
            debug!(error = %err, "dropping malformed room-hum payload");
            return None;
        }
    };

    Some((
        message.room,
        RoomCommand::ApplyHumidity {
            humidity_pct: message.humidity,
            at: timestamp_to_utc(message.timestamp),
        },
    ))
}

pub fn parse_room_motion(payload: &[u8]) -> Option<(String, RoomCommand)> {
    let message: RoomMotionMessage = match serde_json::from_slice(payload) {
        Ok(message) => message,
        Err(err) => {
            debug!(error = %err, "dropping malformed room-motion payload");
            return None;
        }
    };

    Some((
        message.room,
        RoomCommand::ApplyMotion {
            motion: message.motion,
            at: timestamp_to_utc(message.timestamp),
        },
    ))
}

/// `light_level` is interpreted against `dark_threshold`/`bright_threshold`
/// rather than trusting the payload's own `light_state` field — the
/// engine derives that classification itself ("`light-state`
/// is derived") so a sensor emitting a stale or incorrect label can't
/// desync the engine from its own thresholds.
pub fn parse_room_light(payload: &[u8], dark_threshold: u8, bright_threshold: u8) -> Option<(String, RoomCommand)> {
    let message: RoomLightMessage = match serde_json::from_slice(payload) {
        Ok(message) => message,
        Err(err) => {
            debug!(error = %err, "dropping malformed room-light payload");
            return None;
        }
    };

    Some((
        message.room,
        RoomCommand::ApplyLight {
            light_level: message.light_level,
            dark_threshold,
            bright_threshold,
            at: timestamp_to_utc(message.timestamp),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_room_temp_payload() {
        let json = serde_json::json!({
            "temperature": 71.2,
            "humidity": 42.0,
            "unit": "F",
            "room": "bedroom",
            "sensor": "dht22",
            "timestamp": 1_700_000_000i64,
            "device_id": "sensor-1"
        });

        let (room, command) = parse_room_temp(&serde_json::to_vec(&json).unwrap()).expect("parses");
        assert_eq!(room, "bedroom");
        assert!(matches!(command, RoomCommand::ApplyTemperature { temperature_f, .. } if temperature_f == 71.2));
    }

    #[test]
    fn malformed_payload_is_dropped_not_panicked() {
        assert!(parse_room_temp(b"not json").is_none());
        assert!(parse_room_motion(b"{}").is_none());
    }

    #[test]
    fn parses_room_light_deriving_state_from_thresholds() {
        let json = serde_json::json!({
            "light_level": 5u8,
            "light_state": "bright",
            "room": "kitchen",
            "sensor": "phototransistor",
            "timestamp": 1_700_000_000i64,
            "device_id": "sensor-2"
        });

        let (room, command) = parse_room_light(&serde_json::to_vec(&json).unwrap(), 10, 80).expect("parses");
        assert_eq!(room, "kitchen");
        assert!(matches!(command, RoomCommand::ApplyLight { light_level: 5, .. }));
    }
}
