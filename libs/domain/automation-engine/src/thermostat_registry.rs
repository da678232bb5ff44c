// [libs/domain/automation-engine/src/thermostat_registry.rs]
//! Thermostat configuration table. Exclusively owned
//! by the automation engine — the control loop reads and writes it
//! directly rather than through a room actor, since a thermostat's
//! `target`/`mode` mutate from an external command surface, not from
//! a sensor topic.

use std::collections::HashMap;
use std::sync::RwLock;

use fabric_shared_errors::FabricError;

use fabric_domain_models::thermostat::{ThermostatConfig, ThermostatMode, ThermostatStatus};

#[derive(Default)]
pub struct ThermostatRegistry {
    thermostats: RwLock<HashMap<String, ThermostatConfig>>,
}

impl ThermostatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, config: ThermostatConfig) {
        self.thermostats.write().expect("thermostat registry lock poisoned").insert(config.id.clone(), config);
    }

    pub fn get(&self, id: &str) -> Option<ThermostatConfig> {
        self.thermostats.read().expect("thermostat registry lock poisoned").get(id).cloned()
    }

    /// Every thermostat currently registered for `room_id` (
    /// "for each registered thermostat" — a room may host more than one).
    pub fn for_room(&self, room_id: &str) -> Vec<ThermostatConfig> {
        self.thermostats
            .read()
            .expect("thermostat registry lock poisoned")
            .values()
            .filter(|thermostat| thermostat.room_id == room_id)
            .cloned()
            .collect()
    }

    pub fn snapshot(&self) -> Vec<ThermostatConfig> {
        self.thermostats.read().expect("thermostat registry lock poisoned").values().cloned().collect()
    }

    /// Validates against `[min_f, max_f]` before mutating (
    /// "out-of-range targets are rejected... the thermostat is unchanged").
    pub fn set_target(&self, id: &str, target_f: f64) -> Result<(), FabricError> {
        let mut thermostats = self.thermostats.write().expect("thermostat registry lock poisoned");
        let thermostat = thermostats.get_mut(id).ok_or_else(|| FabricError::validation(format!("thermostat {id} not registered")))?;

        thermostat.validate_target(target_f).map_err(FabricError::validation)?;
        thermostat.target_f = target_f;
        Ok(())
    }

    pub fn set_mode(&self, id: &str, mode: ThermostatMode) -> Result<(), FabricError> {
        let mut thermostats = self.thermostats.write().expect("thermostat registry lock poisoned");
        let thermostat = thermostats.get_mut(id).ok_or_else(|| FabricError::validation(format!("thermostat {id} not registered")))?;
        thermostat.mode = mode;
        Ok(())
    }

    /// Called only by the control loop after it computes a new status
    /// from the pure transition function — never by an external caller.
    pub(crate) fn set_status(&self, id: &str, status: ThermostatStatus) {
        if let Some(thermostat) = self.thermostats.write().expect("thermostat registry lock poisoned").get_mut(id) {
            thermostat.status = status;
        }
    }
}
