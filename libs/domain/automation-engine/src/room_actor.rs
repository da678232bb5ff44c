// [libs/domain/automation-engine/src/room_actor.rs]
/*!
 * Single-writer actor owning one room's `RoomSensorState`. All four
 * topic families funnel through this actor's command channel, which
 * is what makes concurrent updates from independent bus subscriptions
 * linearize without a lock held across an await point — the same
 * single-owner-actor shape the Tapo client uses for a device session.
 *
 * Every mutation emits a `RoomEvent` onto a shared broadcast channel
 * so the thermostat control task and the motion-lighting task can
 * react without holding a reference into this actor's state.
 */

use chrono::{DateTime, Utc};
use fabric_domain_models::room::{LightState, RoomSensorState};
use tokio::sync::{broadcast, mpsc, oneshot};

#[derive(Debug, Clone)]
pub enum RoomEvent {
    TemperatureChanged { room_id: String, current_f: f64 },
    LightChanged { room_id: String, state: LightState },
    MotionArrived { room_id: String },
    MotionCleared { room_id: String },
}

pub enum RoomCommand {
    ApplyTemperature {
        temperature_f: f64,
        humidity_pct: Option<f64>,
        at: DateTime<Utc>,
    },
    ApplyHumidity {
        humidity_pct: f64,
        at: DateTime<Utc>,
    },
    ApplyMotion {
        motion: bool,
        at: DateTime<Utc>,
    },
    ApplyLight {
        light_level: u8,
        dark_threshold: u8,
        bright_threshold: u8,
        at: DateTime<Utc>,
    },
    Snapshot(oneshot::Sender<RoomSensorState>),
    MarkOfflineIfStale {
        now: DateTime<Utc>,
        idle_window: chrono::Duration,
    },
}

/// Runs one room's actor loop until its command channel is closed
/// (the engine drops every sender on shutdown, which is what ends
/// this task — there is no separate cancellation token per room).
pub async fn run_room_actor(room_id: String, mut commands: mpsc::Receiver<RoomCommand>, events: broadcast::Sender<RoomEvent>) {
    let mut state = RoomSensorState::new(room_id.clone());

    while let Some(command) = commands.recv().await {
        match command {
            RoomCommand::ApplyTemperature {
                temperature_f,
                humidity_pct,
                at,
            } => {
                state.temperature_f = Some(temperature_f);
                if humidity_pct.is_some() {
                    state.humidity_pct = humidity_pct;
                }
                state.last_update = Some(at);
                state.online = true;
                let _ = events.send(RoomEvent::TemperatureChanged {
                    room_id: room_id.clone(),
                    current_f: temperature_f,
                });
            }
            RoomCommand::ApplyHumidity { humidity_pct, at } => {
                state.humidity_pct = Some(humidity_pct);
                state.last_update = Some(at);
                state.online = true;
            }
            RoomCommand::ApplyMotion { motion, at } => {
                let was_occupied = state.occupied;
                state.occupied = motion;
                state.last_update = Some(at);
                state.online = true;

                if motion {
                    state.last_motion_at = Some(at);
                    if !was_occupied {
                        let _ = events.send(RoomEvent::MotionArrived { room_id: room_id.clone() });
                    }
                } else {
                    state.last_cleared_at = Some(at);
                    if was_occupied {
                        let _ = events.send(RoomEvent::MotionCleared { room_id: room_id.clone() });
                    }
                }
            }
            RoomCommand::ApplyLight {
                light_level,
                dark_threshold,
                bright_threshold,
                at,
            } => {
                let previous_state = state.light_state;
                let next_state = LightState::from_level(light_level, dark_threshold, bright_threshold);

                state.light_level = Some(light_level);
                state.light_state = Some(next_state);
                state.last_update = Some(at);
                state.online = true;

                if previous_state != Some(next_state) {
                    let _ = events.send(RoomEvent::LightChanged {
                        room_id: room_id.clone(),
                        state: next_state,
                    });
                }
            }
            RoomCommand::Snapshot(reply) => {
                let _ = reply.send(state.clone());
            }
            RoomCommand::MarkOfflineIfStale { now, idle_window } => {
                let stale = match state.last_motion_at {
                    None => true,
                    Some(last_motion) => now - last_motion > idle_window,
                };
                if stale {
                    state.online = false;
                }
            }
        }
    }
}
