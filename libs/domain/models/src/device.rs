// [libs/domain/models/src/device.rs]
//! Device descriptor, device session, and the uniform `DeviceInfo` /
//! `EnergyUsage` shapes both Tapo drivers produce.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which protocol driver a device descriptor is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverKind {
    Legacy,
    Klap,
}

/// Static configuration for one Tapo plug. Created at config load,
/// mutated by add/remove, destroyed on shutdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub id: String,
    pub name: String,
    pub room_id: String,
    pub ip_address: String,
    pub username: String,
    pub password: String,
    pub driver: DriverKind,
    pub poll_period_secs: u64,
    pub created_at: DateTime<Utc>,
}

impl DeviceDescriptor {
    pub fn default_poll_period_secs() -> u64 {
        30
    }
}

/// The encryption/session material the polling service holds on a
/// per-device basis. Invalidated on any decryption/auth failure or
/// idle timeout; re-established lazily on the next poll tick.
#[derive(Debug, Clone, Default)]
pub struct DeviceSession {
    pub handshake_complete: bool,
    /// 16-byte AES-128-GCM session key (KLAP only).
    pub session_key: Option<[u8; 16]>,
    /// 12-byte IV base (KLAP only) — combined with the big-endian
    /// sequence number to build the per-request nonce.
    pub iv_base: Option<[u8; 12]>,
    /// Monotonic request sequence. First request after handshake uses 1.
    pub sequence: u32,
    /// Legacy driver's bearer token, or KLAP's session cookie header.
    pub token_or_cookie: Option<String>,
    pub last_error: Option<String>,
    pub last_success_at: Option<DateTime<Utc>>,
}

impl DeviceSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sequence number for the *next* request, advanced only after a
    /// successful send ("a failed send does not consume a
    /// sequence number").
    pub fn next_sequence(&mut self) -> u32 {
        if self.sequence == 0 {
            self.sequence = 1;
        }
        self.sequence
    }

    pub fn advance_sequence(&mut self) {
        self.sequence = self.sequence.saturating_add(1);
    }

    pub fn invalidate(&mut self, reason: impl Into<String>) {
        self.handshake_complete = false;
        self.session_key = None;
        self.iv_base = None;
        self.sequence = 0;
        self.token_or_cookie = None;
        self.last_error = Some(reason.into());
    }
}

/// Device-info shape both drivers normalize to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub device_id: String,
    pub model: String,
    pub firmware_version: String,
    pub is_on: bool,
    pub rssi: i32,
    pub signal_level: u8,
}

/// Energy-usage shape both drivers normalize to, already converted to
/// watts/watt-hours at the client boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyUsage {
    pub current_power_w: f64,
    pub today_energy_wh: f64,
    pub month_energy_wh: f64,
    pub runtime_minutes: u64,
}

/// One poll's worth of published telemetry, published to `tapo/<id>/energy`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyReading {
    pub device_id: String,
    pub device_name: String,
    pub room_id: String,
    pub power_w: f64,
    pub energy_wh: f64,
    pub is_on: bool,
    pub signal_strength: i32,
    pub timestamp: i64,
}
