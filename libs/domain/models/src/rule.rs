// [libs/domain/models/src/rule.rs]
//! Automation rule: condition set, action list, cooldown.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A condition the motion-lighting rule evaluates. Kept small and
/// closed — the engine only ever needs these two shapes (
/// motion-arrival, darkening-while-occupied).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleCondition {
    MotionArrivalInDark,
    DarkeningWhileOccupied,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleAction {
    TurnOn { target_device_id: String },
    TurnOff { target_device_id: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationRule {
    pub id: String,
    pub room_id: String,
    pub target_device_id: String,
    pub conditions: Vec<RuleCondition>,
    pub actions: Vec<RuleAction>,
    pub enabled: bool,
    pub cooldown_secs: u64,
    pub last_fired_at: Option<DateTime<Utc>>,
}

impl AutomationRule {
    pub fn new_motion_light(room_id: impl Into<String>, target_device_id: impl Into<String>, cooldown_secs: u64) -> Self {
        let room_id = room_id.into();
        let target_device_id = target_device_id.into();
        Self {
            id: format!("motion-light-{room_id}"),
            room_id,
            conditions: vec![
                RuleCondition::MotionArrivalInDark,
                RuleCondition::DarkeningWhileOccupied,
            ],
            actions: vec![RuleAction::TurnOn {
                target_device_id: target_device_id.clone(),
            }],
            target_device_id,
            enabled: true,
            cooldown_secs,
            last_fired_at: None,
        }
    }

    /// A rule fires only if `now - last_fired >= cooldown`; firing
    /// updates `last_fired` to `now`.
    pub fn can_fire(&self, now: DateTime<Utc>) -> bool {
        if !self.enabled {
            return false;
        }
        match self.last_fired_at {
            None => true,
            Some(last) => (now - last).num_seconds() >= self.cooldown_secs as i64,
        }
    }

    pub fn record_fired(&mut self, now: DateTime<Utc>) {
        self.last_fired_at = Some(now);
    }
}
