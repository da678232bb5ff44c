// [apps/fabric-node/src/config.rs]
//! Structured configuration: Tapo devices, engine
//! tunables, discovery settings, and the message bus binding to use.
//! Loaded from a TOML file (or an inline string, for tests) via
//! `serde`. Cyclic or missing required fields are a fatal
//! refuse-to-start error — `FabricConfig::load` validates
//! eagerly rather than deferring to first use.

use std::collections::HashSet;
use std::path::Path;

use chrono::Utc;
use fabric_domain_models::asset::{AssetRecord, AssetStatus};
use fabric_domain_models::device::{DeviceDescriptor, DriverKind};
use fabric_domain_models::thermostat::{ThermostatConfig, ThermostatMode};
use fabric_shared_errors::FabricError;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct FabricConfig {
    #[serde(default)]
    pub devices: Vec<TapoDeviceSection>,
    #[serde(default)]
    pub thermostats: Vec<ThermostatSection>,
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub discovery: DiscoverySection,
    #[serde(default)]
    pub bus: BusSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TapoDeviceSection {
    pub id: String,
    pub name: String,
    pub room: String,
    pub ip: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_poll_period")]
    pub poll_period: u64,
    #[serde(default)]
    pub use_klap: bool,
}

fn default_poll_period() -> u64 {
    DeviceDescriptor::default_poll_period_secs()
}

impl From<&TapoDeviceSection> for DeviceDescriptor {
    fn from(section: &TapoDeviceSection) -> Self {
        DeviceDescriptor {
            id: section.id.clone(),
            name: section.name.clone(),
            room_id: section.room.clone(),
            ip_address: section.ip.clone(),
            username: section.username.clone(),
            password: section.password.clone(),
            driver: if section.use_klap { DriverKind::Klap } else { DriverKind::Legacy },
            poll_period_secs: section.poll_period,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThermostatSection {
    pub id: String,
    pub room: String,
    #[serde(default)]
    pub target_f: Option<f64>,
    #[serde(default)]
    pub mode: Option<ThermostatModeSection>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThermostatModeSection {
    Off,
    Heat,
    Cool,
    Auto,
    Fan,
}

impl From<ThermostatModeSection> for ThermostatMode {
    fn from(mode: ThermostatModeSection) -> Self {
        match mode {
            ThermostatModeSection::Off => ThermostatMode::Off,
            ThermostatModeSection::Heat => ThermostatMode::Heat,
            ThermostatModeSection::Cool => ThermostatMode::Cool,
            ThermostatModeSection::Auto => ThermostatMode::Auto,
            ThermostatModeSection::Fan => ThermostatMode::Fan,
        }
    }
}

impl ThermostatSection {
    pub fn into_thermostat_config(self, default_hysteresis_f: f64, min_f: f64, max_f: f64) -> ThermostatConfig {
        let mut thermostat = ThermostatConfig::new(self.id, self.room);
        thermostat.hysteresis_f = default_hysteresis_f;
        thermostat.min_f = min_f;
        thermostat.max_f = max_f;
        if let Some(target_f) = self.target_f {
            thermostat.target_f = target_f;
        }
        if let Some(mode) = self.mode {
            thermostat.mode = mode.into();
        }
        thermostat
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    #[serde(default = "default_dark_threshold")]
    pub dark_threshold: u8,
    #[serde(default = "default_bright_threshold")]
    pub bright_threshold: u8,
    #[serde(default = "default_motion_light_cooldown_secs")]
    pub motion_light_cooldown_secs: u64,
    #[serde(default = "default_auto_off_delay_secs")]
    pub auto_off_delay_secs: u64,
    #[serde(default = "default_target_f")]
    pub default_target_f: f64,
    #[serde(default = "default_hysteresis_f")]
    pub default_hysteresis_f: f64,
    #[serde(default = "default_min_f")]
    pub min_f: f64,
    #[serde(default = "default_max_f")]
    pub max_f: f64,
}

fn default_dark_threshold() -> u8 {
    10
}
fn default_bright_threshold() -> u8 {
    80
}
fn default_motion_light_cooldown_secs() -> u64 {
    5 * 60
}
fn default_auto_off_delay_secs() -> u64 {
    10 * 60
}
fn default_target_f() -> f64 {
    70.0
}
fn default_hysteresis_f() -> f64 {
    1.0
}
fn default_min_f() -> f64 {
    50.0
}
fn default_max_f() -> f64 {
    95.0
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            dark_threshold: default_dark_threshold(),
            bright_threshold: default_bright_threshold(),
            motion_light_cooldown_secs: default_motion_light_cooldown_secs(),
            auto_off_delay_secs: default_auto_off_delay_secs(),
            default_target_f: default_target_f(),
            default_hysteresis_f: default_hysteresis_f(),
            min_f: default_min_f(),
            max_f: default_max_f(),
        }
    }
}

impl From<&EngineSection> for fabric_domain_automation_engine::EngineConfig {
    fn from(section: &EngineSection) -> Self {
        fabric_domain_automation_engine::EngineConfig {
            dark_threshold: section.dark_threshold,
            bright_threshold: section.bright_threshold,
            motion_light_cooldown: std::time::Duration::from_secs(section.motion_light_cooldown_secs),
            auto_off_delay: std::time::Duration::from_secs(section.auto_off_delay_secs),
            default_target_f: section.default_target_f,
            default_hysteresis_f: section.default_hysteresis_f,
            min_f: section.min_f,
            max_f: section.max_f,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiscoverySection {
    #[serde(default)]
    pub local_asset: Option<LocalAssetSection>,
    #[serde(default = "default_true")]
    pub auto_query: bool,
    #[serde(default = "default_query_interval_secs")]
    pub query_interval_secs: u64,
    #[serde(default = "default_announce_interval_secs")]
    pub announce_interval_secs: u64,
    #[serde(default = "default_max_event_log")]
    pub max_event_log: usize,
}

fn default_true() -> bool {
    true
}
fn default_query_interval_secs() -> u64 {
    5 * 60
}
fn default_announce_interval_secs() -> u64 {
    60
}
fn default_max_event_log() -> usize {
    1000
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalAssetSection {
    pub id: String,
    #[serde(rename = "type")]
    pub asset_type: String,
    pub name: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub version: String,
    pub ip_address: String,
    #[serde(default)]
    pub mac_address: String,
    #[serde(default)]
    pub hostname: String,
    pub room: String,
    #[serde(default)]
    pub zone: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default = "default_ttl_secs")]
    pub ttl: u64,
}

fn default_ttl_secs() -> u64 {
    60
}

impl From<LocalAssetSection> for AssetRecord {
    fn from(section: LocalAssetSection) -> Self {
        AssetRecord {
            id: section.id,
            asset_type: section.asset_type,
            name: section.name,
            model: section.model,
            manufacturer: section.manufacturer,
            version: section.version,
            ip_address: section.ip_address,
            mac_address: section.mac_address,
            hostname: section.hostname,
            room: section.room,
            zone: section.zone,
            capabilities: section.capabilities,
            services: vec![],
            status: AssetStatus::Online,
            health: "ok".to_string(),
            battery_level: None,
            last_seen: Utc::now().timestamp(),
            ttl: section.ttl,
            created_at: Some(Utc::now()),
        }
    }
}

impl From<&DiscoverySection> for fabric_infra_discovery::DiscoveryConfig {
    fn from(section: &DiscoverySection) -> Self {
        fabric_infra_discovery::DiscoveryConfig {
            local_asset: section.local_asset.clone().map(AssetRecord::from),
            auto_query: section.auto_query,
            query_interval: std::time::Duration::from_secs(section.query_interval_secs),
            announce_interval: std::time::Duration::from_secs(section.announce_interval_secs),
            max_event_log: section.max_event_log,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BusSection {
    Memory,
    Mqtt {
        #[serde(default = "default_mqtt_host")]
        host: String,
        #[serde(default = "default_mqtt_port")]
        port: u16,
        #[serde(default = "default_mqtt_client_id")]
        client_id: String,
    },
}

fn default_mqtt_host() -> String {
    "localhost".to_string()
}
fn default_mqtt_port() -> u16 {
    1883
}
fn default_mqtt_client_id() -> String {
    "fabric-node".to_string()
}

impl Default for BusSection {
    fn default() -> Self {
        BusSection::Memory
    }
}

impl FabricConfig {
    pub fn load(path: &Path) -> Result<Self, FabricError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| FabricError::critical(fabric_shared_errors::ErrorKind::Service, format!("reading config {}: {err}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, FabricError> {
        let config: FabricConfig = toml::from_str(raw)
            .map_err(|err| FabricError::critical(fabric_shared_errors::ErrorKind::Validation, format!("malformed config: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Fatal config errors: cyclic or missing required fields refuse
    /// to start. A device descriptor's id must be globally unique
    /// within a process; two descriptors with the same id are a
    /// configuration error.
    fn validate(&self) -> Result<(), FabricError> {
        let mut seen_device_ids = HashSet::new();
        for device in &self.devices {
            if !seen_device_ids.insert(device.id.as_str()) {
                return Err(FabricError::critical(
                    fabric_shared_errors::ErrorKind::Validation,
                    format!("duplicate device id in config: {}", device.id),
                ));
            }
        }

        let mut seen_thermostat_ids = HashSet::new();
        for thermostat in &self.thermostats {
            if !seen_thermostat_ids.insert(thermostat.id.as_str()) {
                return Err(FabricError::critical(
                    fabric_shared_errors::ErrorKind::Validation,
                    format!("duplicate thermostat id in config: {}", thermostat.id),
                ));
            }
        }

        Ok(())
    }
}
