// [libs/domain/automation-engine/src/config.rs]
//! Engine-wide tunables. Defaults match the contract: dark below 10%,
//! bright above 80%, 5-minute motion-light cooldown, 10-minute
//! auto-off delay (advisory only — see `motion_lighting`), default
//! thermostat target 70°F with a 1°F hysteresis band and a 50–95°F
//! allowed range.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub dark_threshold: u8,
    pub bright_threshold: u8,
    pub motion_light_cooldown: Duration,
    pub auto_off_delay: Duration,
    pub default_target_f: f64,
    pub default_hysteresis_f: f64,
    pub min_f: f64,
    pub max_f: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dark_threshold: 10,
            bright_threshold: 80,
            motion_light_cooldown: Duration::from_secs(5 * 60),
            auto_off_delay: Duration::from_secs(10 * 60),
            default_target_f: 70.0,
            default_hysteresis_f: 1.0,
            min_f: 50.0,
            max_f: 95.0,
        }
    }
}

/// The six rooms the default auto-light rule set targets, each with a
/// `light-<room>` device. A deployment with a different room layout
/// constructs its own `RuleRegistry` instead of using this list.
pub const DEFAULT_AUTO_LIGHT_ROOMS: [&str; 6] = ["kitchen", "living-room", "bedroom", "bathroom", "hallway", "office"];
