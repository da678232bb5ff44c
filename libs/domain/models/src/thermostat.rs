// [libs/domain/models/src/thermostat.rs]
//! Thermostat configuration and the hysteresis transition function:
//! once a setpoint trips heat/cool on, it only trips back off past
//! the hysteresis band, never right at the setpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThermostatMode {
    Off,
    Heat,
    Cool,
    Auto,
    Fan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThermostatStatus {
    Idle,
    Heating,
    Cooling,
    Fan,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermostatConfig {
    pub id: String,
    pub room_id: String,
    pub target_f: f64,
    pub mode: ThermostatMode,
    pub status: ThermostatStatus,
    pub hysteresis_f: f64,
    pub min_f: f64,
    pub max_f: f64,
    pub heat_enabled: bool,
    pub cool_enabled: bool,
    pub fan_speed: u8,
    pub created_at: DateTime<Utc>,
}

impl ThermostatConfig {
    pub fn new(id: impl Into<String>, room_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            room_id: room_id.into(),
            target_f: 70.0,
            mode: ThermostatMode::Off,
            status: ThermostatStatus::Idle,
            hysteresis_f: 1.0,
            min_f: 50.0,
            max_f: 95.0,
            heat_enabled: true,
            cool_enabled: true,
            fan_speed: 0,
            created_at: Utc::now(),
        }
    }

    /// Validates a proposed target against `[min_f, max_f]`:
    /// out-of-range targets are rejected and the thermostat is left
    /// unchanged.
    pub fn validate_target(&self, target_f: f64) -> Result<(), String> {
        if target_f < self.min_f || target_f > self.max_f {
            Err(format!(
                "target {target_f} outside allowed range [{}, {}]",
                self.min_f, self.max_f
            ))
        } else {
            Ok(())
        }
    }
}

/// The pure transition function  Given the current
/// status, mode, measured temperature, and configured target/hysteresis,
/// returns the next status with no side effects — callers decide
/// whether to publish a command by comparing the result to the
/// previous status.
pub fn next_thermostat_status(
    mode: ThermostatMode,
    previous_status: ThermostatStatus,
    current_f: f64,
    target_f: f64,
    hysteresis_f: f64,
) -> ThermostatStatus {
    let half_band = hysteresis_f / 2.0;

    match mode {
        ThermostatMode::Off => ThermostatStatus::Idle,
        ThermostatMode::Fan => ThermostatStatus::Fan,
        ThermostatMode::Heat => {
            if current_f < target_f - half_band {
                ThermostatStatus::Heating
            } else if previous_status == ThermostatStatus::Heating && current_f >= target_f {
                ThermostatStatus::Idle
            } else {
                previous_status
            }
        }
        ThermostatMode::Cool => {
            if current_f > target_f + half_band {
                ThermostatStatus::Cooling
            } else if previous_status == ThermostatStatus::Cooling && current_f <= target_f {
                ThermostatStatus::Idle
            } else {
                previous_status
            }
        }
        ThermostatMode::Auto => {
            if current_f < target_f - half_band {
                ThermostatStatus::Heating
            } else if current_f > target_f + half_band {
                ThermostatStatus::Cooling
            } else if (previous_status == ThermostatStatus::Heating && current_f >= target_f)
                || (previous_status == ThermostatStatus::Cooling && current_f <= target_f)
            {
                ThermostatStatus::Idle
            } else {
                previous_status
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scenario 1  target 70, hysteresis 1, mode heat.
    /// Trace 70.0, 69.8, 69.4, 70.0, 70.1 should engage then
    /// disengage exactly once.
    #[test]
    fn heating_engages_then_disengages() {
        let target = 70.0;
        let hysteresis = 1.0;
        let mut status = ThermostatStatus::Idle;
        let mut transitions = Vec::new();

        for current in [70.0, 69.8, 69.4, 70.0, 70.1] {
            let next = next_thermostat_status(ThermostatMode::Heat, status, current, target, hysteresis);
            transitions.push(next);
            status = next;
        }

        assert_eq!(
            transitions,
            vec![
                ThermostatStatus::Idle,
                ThermostatStatus::Idle,
                ThermostatStatus::Heating,
                ThermostatStatus::Idle,
                ThermostatStatus::Idle,
            ]
        );
    }

    #[test]
    fn cooling_is_symmetric_to_heating() {
        let target = 70.0;
        let hysteresis = 1.0;
        let mut status = ThermostatStatus::Idle;
        let mut transitions = Vec::new();

        for current in [70.0, 70.2, 70.6, 70.0, 69.9] {
            let next = next_thermostat_status(ThermostatMode::Cool, status, current, target, hysteresis);
            transitions.push(next);
            status = next;
        }

        assert_eq!(
            transitions,
            vec![
                ThermostatStatus::Idle,
                ThermostatStatus::Idle,
                ThermostatStatus::Cooling,
                ThermostatStatus::Idle,
                ThermostatStatus::Idle,
            ]
        );
    }

    #[test]
    fn hysteresis_band_never_triggers_wrong_direction() {
        // property  entering the band from below never
        // triggers cooling; entering from above never triggers heating
        let target = 70.0;
        let hysteresis = 2.0;

        let from_below = next_thermostat_status(
            ThermostatMode::Auto,
            ThermostatStatus::Heating,
            69.5,
            target,
            hysteresis,
        );
        assert_ne!(from_below, ThermostatStatus::Cooling);

        let from_above = next_thermostat_status(
            ThermostatMode::Auto,
            ThermostatStatus::Cooling,
            70.5,
            target,
            hysteresis,
        );
        assert_ne!(from_above, ThermostatStatus::Heating);
    }

    #[test]
    fn off_mode_always_idles_regardless_of_temperature() {
        let status = next_thermostat_status(ThermostatMode::Off, ThermostatStatus::Heating, 40.0, 70.0, 1.0);
        assert_eq!(status, ThermostatStatus::Idle);
    }

    #[test]
    fn fan_mode_has_no_thermal_logic() {
        let status = next_thermostat_status(ThermostatMode::Fan, ThermostatStatus::Idle, 200.0, 70.0, 1.0);
        assert_eq!(status, ThermostatStatus::Fan);
    }

    #[test]
    fn target_validation_rejects_out_of_range() {
        let thermostat = ThermostatConfig::new("t1", "bedroom");
        assert!(thermostat.validate_target(40.0).is_err());
        assert!(thermostat.validate_target(200.0).is_err());
        assert!(thermostat.validate_target(72.0).is_ok());
    }
}
