// [libs/domain/models/src/messages.rs]
//! Wire-level JSON payload shapes for every sensor/control topic
//! family, plus the discovery envelope. These are the
//! types `serde_json` (de)serializes directly against the bytes that
//! cross the message bus / multicast socket — field names are
//! already the wire's snake_case, so no renaming is needed beyond
//! what's marked explicitly.

use serde::{Deserialize, Serialize};

use crate::asset::AssetRecord;
use crate::room::LightState;

// --- Sensor input ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomTempMessage {
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    pub unit: String,
    pub room: String,
    pub sensor: String,
    pub timestamp: i64,
    pub device_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomHumidityMessage {
    pub humidity: f64,
    pub room: String,
    pub timestamp: i64,
    pub device_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomMotionMessage {
    pub motion: bool,
    pub room: String,
    pub sensor: String,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motion_start: Option<i64>,
    pub device_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomLightMessage {
    pub light_level: u8,
    pub light_state: LightState,
    pub room: String,
    pub sensor: String,
    pub timestamp: i64,
    pub device_id: String,
}

// --- Control output ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomControlMessage {
    pub action: String,
    pub target_f: f64,
    pub reason: String,
    pub ts: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceCommandAction {
    TurnOn,
    TurnOff,
    SetBrightness,
    SetTemperature,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceCommandMessage {
    pub action: DeviceCommandAction,
    pub value: serde_json::Value,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub options: serde_json::Map<String, serde_json::Value>,
}

// --- Discovery envelope ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscoveryEnvelope {
    Announce {
        sender_id: String,
        timestamp: i64,
        #[serde(flatten)]
        asset: AssetRecord,
    },
    Query {
        sender_id: String,
        timestamp: i64,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        asset_types: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        capabilities: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        room: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max_age_secs: Option<i64>,
    },
    Response {
        sender_id: String,
        timestamp: i64,
        #[serde(flatten)]
        asset: AssetRecord,
    },
}

/// Datagrams larger than this are dropped with a log line.
pub const MAX_DISCOVERY_DATAGRAM_BYTES: usize = 8 * 1024;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetStatus;

    fn sample_asset() -> AssetRecord {
        AssetRecord {
            id: "a1".into(),
            asset_type: "gateway".into(),
            name: "Office Gateway".into(),
            model: "GW-1".into(),
            manufacturer: "Fabric".into(),
            version: "1.0".into(),
            ip_address: "10.0.0.5".into(),
            mac_address: "aa:bb:cc:dd:ee:ff".into(),
            hostname: "gw1.local".into(),
            room: "office".into(),
            zone: "main".into(),
            capabilities: vec!["discovery".into()],
            services: vec![],
            status: AssetStatus::Online,
            health: "ok".into(),
            battery_level: None,
            last_seen: 1000,
            ttl: 60,
            created_at: None,
        }
    }

    /// Round-trip invariant  an envelope emitted by the
    /// announce path, parsed by the receive path, yields an asset
    /// record equal field-wise to the original.
    #[test]
    fn announce_envelope_round_trips() {
        let envelope = DiscoveryEnvelope::Announce {
            sender_id: "node-a".into(),
            timestamp: 1000,
            asset: sample_asset(),
        };

        let json = serde_json::to_string(&envelope).expect("serialize");
        let parsed: DiscoveryEnvelope = serde_json::from_str(&json).expect("deserialize");

        match parsed {
            DiscoveryEnvelope::Announce { asset, .. } => {
                assert_eq!(asset.id, sample_asset().id);
                assert_eq!(asset.last_seen, sample_asset().last_seen);
                assert_eq!(asset.capabilities, sample_asset().capabilities);
            }
            _ => panic!("expected announce variant"),
        }
    }

    #[test]
    fn query_envelope_with_empty_filters_round_trips() {
        let envelope = DiscoveryEnvelope::Query {
            sender_id: "node-b".into(),
            timestamp: 2000,
            asset_types: vec![],
            capabilities: vec![],
            room: None,
            max_age_secs: None,
        };

        let json = serde_json::to_string(&envelope).expect("serialize");
        let parsed: DiscoveryEnvelope = serde_json::from_str(&json).expect("deserialize");

        match parsed {
            DiscoveryEnvelope::Query { asset_types, room, .. } => {
                assert!(asset_types.is_empty());
                assert!(room.is_none());
            }
            _ => panic!("expected query variant"),
        }
    }

    #[test]
    fn room_temp_message_matches_wire_field_names() {
        let json = serde_json::json!({
            "temperature": 70.5,
            "humidity": 45.0,
            "unit": "F",
            "room": "bedroom",
            "sensor": "dht22",
            "timestamp": 1_700_000_000i64,
            "device_id": "sensor-1"
        });

        let parsed: RoomTempMessage = serde_json::from_value(json).expect("deserialize");
        assert_eq!(parsed.room, "bedroom");
        assert_eq!(parsed.humidity, Some(45.0));
    }
}
