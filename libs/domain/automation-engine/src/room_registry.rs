// [libs/domain/automation-engine/src/room_registry.rs]
//! Lazily spawns one room actor per room id the first time a message
//! for that room arrives, and hands out its command sender on every
//! later lookup. Mirrors the lazy-worker-per-key pattern used for
//! per-device polling tasks, but keyed by room id instead of device id.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::task::JoinSet;

use crate::room_actor::{run_room_actor, RoomCommand, RoomEvent};

const ROOM_COMMAND_CHANNEL_CAPACITY: usize = 64;

pub struct RoomRegistry {
    rooms: Mutex<HashMap<String, mpsc::Sender<RoomCommand>>>,
    events: broadcast::Sender<RoomEvent>,
    tasks: Mutex<JoinSet<()>>,
}

impl RoomRegistry {
    pub fn new(events: broadcast::Sender<RoomEvent>) -> Arc<Self> {
        Arc::new(Self {
            rooms: Mutex::new(HashMap::new()),
            events,
            tasks: Mutex::new(JoinSet::new()),
        })
    }

    /// Returns the command sender for `room_id`, spawning its actor on
    /// first use.
    pub async fn sender_for(&self, room_id: &str) -> mpsc::Sender<RoomCommand> {
        let mut rooms = self.rooms.lock().await;
        if let Some(existing) = rooms.get(room_id) {
            return existing.clone();
        }

        let (tx, rx) = mpsc::channel(ROOM_COMMAND_CHANNEL_CAPACITY);
        let mut tasks = self.tasks.lock().await;
        tasks.spawn(run_room_actor(room_id.to_string(), rx, self.events.clone()));
        rooms.insert(room_id.to_string(), tx.clone());
        tx
    }

    /// Returns command senders for every room actor spawned so far, for
    /// periodic fan-out (janitor tick, control tick).
    pub async fn all_senders(&self) -> Vec<(String, mpsc::Sender<RoomCommand>)> {
        let rooms = self.rooms.lock().await;
        rooms.iter().map(|(id, tx)| (id.clone(), tx.clone())).collect()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<RoomEvent> {
        self.events.subscribe()
    }

    /// Drops every room actor's command sender, which ends each actor
    /// loop, then waits for all of them to finish.
    pub async fn shutdown(&self) {
        self.rooms.lock().await.clear();
        let mut tasks = self.tasks.lock().await;
        while tasks.join_next().await.is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room_actor::RoomCommand;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn sender_for_same_room_reuses_actor() {
        let (events_tx, _events_rx) = broadcast::channel(16);
        let registry = RoomRegistry::new(events_tx);

        let sender_a = registry.sender_for("kitchen").await;
        let sender_b = registry.sender_for("kitchen").await;

        let (reply_tx, reply_rx) = oneshot::channel();
        sender_a
            .send(RoomCommand::ApplyHumidity {
                humidity_pct: 55.0,
                at: chrono::Utc::now(),
            })
            .await
            .unwrap();
        sender_b.send(RoomCommand::Snapshot(reply_tx)).await.unwrap();
        let snapshot = reply_rx.await.unwrap();
        assert_eq!(snapshot.humidity_pct, Some(55.0));
    }

    #[tokio::test]
    async fn distinct_rooms_get_distinct_actors() {
        let (events_tx, _events_rx) = broadcast::channel(16);
        let registry = RoomRegistry::new(events_tx);

        registry.sender_for("kitchen").await;
        registry.sender_for("bedroom").await;

        let all = registry.all_senders().await;
        assert_eq!(all.len(), 2);
    }
}
