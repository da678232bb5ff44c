// [libs/infra/polling/src/status.rs]
//! Per-device status snapshot returned by `PollingService::status()`.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default)]
pub struct DeviceStatus {
    pub connected: bool,
    pub last_reading_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}
