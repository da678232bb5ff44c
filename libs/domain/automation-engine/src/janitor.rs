// [libs/domain/automation-engine/src/janitor.rs]
//! The engine's 5-minute janitor: marks a room offline
//! if no motion sample has arrived in the last 10 minutes. The actual
//! staleness check lives in the room actor (`RoomCommand::MarkOfflineIfStale`)
//! so this task only needs to know which rooms exist and fan the tick
//! out to each of them.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::room_actor::RoomCommand;
use crate::room_registry::RoomRegistry;

const JANITOR_INTERVAL: Duration = Duration::from_secs(5 * 60);

pub async fn run_engine_janitor(rooms: Arc<RoomRegistry>, idle_window: chrono::Duration, cancel: CancellationToken) {
    let mut tick = tokio::time::interval(JANITOR_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tick.tick() => {
                let now = Utc::now();
                for (_, sender) in rooms.all_senders().await {
                    let _ = sender.send(RoomCommand::MarkOfflineIfStale { now, idle_window }).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::{broadcast, oneshot};

    #[tokio::test]
    async fn janitor_tick_marks_idle_room_offline() {
        let (events_tx, _events_rx) = broadcast::channel(16);
        let registry = RoomRegistry::new(events_tx);

        let sender = registry.sender_for("kitchen").await;
        let t0 = Utc::now() - chrono::Duration::minutes(20);
        sender.send(RoomCommand::ApplyMotion { motion: true, at: t0 }).await.unwrap();

        for (_, tx) in registry.all_senders().await {
            tx.send(RoomCommand::MarkOfflineIfStale {
                now: Utc::now(),
                idle_window: chrono::Duration::minutes(10),
            })
            .await
            .unwrap();
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        sender.send(RoomCommand::Snapshot(reply_tx)).await.unwrap();
        let snapshot = reply_rx.await.unwrap();
        assert!(!snapshot.online);
    }
}
