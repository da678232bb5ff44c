// [libs/domain/models/src/asset.rs]
//! Asset record: any discoverable node on the LAN.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub name: String,
    pub protocol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    Online,
    Degraded,
    Offline,
}

/// Full asset record, carried verbatim in both `announce` and
/// `response` discovery messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub name: String,
    pub model: String,
    pub manufacturer: String,
    pub version: String,
    pub ip_address: String,
    pub mac_address: String,
    pub hostname: String,
    pub room: String,
    pub zone: String,
    pub capabilities: Vec<String>,
    pub services: Vec<ServiceEntry>,
    pub status: AssetStatus,
    pub health: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<u8>,
    /// Unix timestamp (seconds). Never moves backwards once an asset
    /// exists in a node's table — `refresh` below enforces this.
    pub last_seen: i64,
    pub ttl: u64,
    #[serde(skip)]
    pub created_at: Option<DateTime<Utc>>,
}

impl AssetRecord {
    /// Whether this record has expired relative to `now`:
    /// `now - last_seen > ttl`.
    pub fn is_expired(&self, now_unix: i64) -> bool {
        now_unix - self.last_seen > self.ttl as i64
    }

    /// Applies an incoming announce/response only if it is not stale.
    /// Returns `true` if the record was updated.
    pub fn refresh_if_newer(&mut self, incoming: &AssetRecord) -> bool {
        if incoming.last_seen <= self.last_seen {
            return false;
        }
        *self = incoming.clone();
        true
    }
}
