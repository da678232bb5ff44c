// [libs/infra/polling/src/poller.rs]
/*!
 * =================================================================
 * APARATO: DEVICE POLLER TASK
 * CLASIFICACION: INFRASTRUCTURE (ESTRATO L3)
 * RESPONSABILIDAD: CICLO DE VIDA DE UN SOLO DISPOSITIVO TAPO
 *
 * One of these per device, spawned by `PollingService::start` and
 * tracked in a `JoinSet`, one long-lived task per worker coordinated
 * from a central struct. The device's `DeviceSession` and
 * `CircuitBreaker` are owned exclusively by this task — nothing else
 * touches them, which is what makes the sequence-number invariant and
 * the breaker's state trivially race-free.
 * =================================================================
 */

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use fabric_domain_models::device::{DeviceDescriptor, DeviceSession, EnergyReading};
use fabric_infra_tapo_client::{DeviceClient, TapoClient};
use fabric_shared_resilience::{Backoff, CircuitBreaker};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{instrument, warn};

use crate::sink::ReadingSink;
use crate::status::DeviceStatus;

/// Commands the service sends into a running poller. Kept to the one
/// operation it needs to expose (`set_state`) — the single-owner
/// actor pattern means this is the only way another task can touch a
/// device's session without a lock across an I/O await point.
pub enum PollerCommand {
    SetOn(bool, oneshot::Sender<Result<(), String>>),
}

#[instrument(skip(descriptor, sinks, cancel, status, commands))]
pub async fn run_poller(
    descriptor: DeviceDescriptor,
    sinks: Vec<Arc<dyn ReadingSink>>,
    cancel: CancellationToken,
    status: Arc<std::sync::RwLock<DeviceStatus>>,
    mut commands: mpsc::Receiver<PollerCommand>,
) {
    let client = TapoClient::new(&descriptor);
    let mut session = DeviceSession::new();
    let mut breaker = CircuitBreaker::default();
    let backoff = Backoff::default();
    let poll_period = Duration::from_secs(descriptor.poll_period_secs.max(1));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(device_id = %descriptor.id, "poller shutting down");
                break;
            }
            command = commands.recv() => {
                match command {
                    Some(PollerCommand::SetOn(on, reply)) => {
                        let outcome = set_on_once(&client, &descriptor, &mut session, on).await;
                        let _ = reply.send(outcome);
                        continue;
                    }
                    None => {
                        tracing::info!(device_id = %descriptor.id, "poller command channel closed, shutting down");
                        break;
                    }
                }
            }
            _ = tokio::time::sleep(poll_period) => {}
        }

        if !breaker.allow_request() {
            if let Ok(mut guard) = status.write() {
                guard.connected = false;
                guard.last_error = Some("circuit breaker open".to_string());
            }
            continue;
        }

        match poll_once(&client, &descriptor, &mut session, &sinks).await {
            Ok(()) => {
                breaker.record_success();
                if let Ok(mut guard) = status.write() {
                    guard.connected = true;
                    guard.last_error = None;
                    guard.last_reading_at = Some(Utc::now());
                }
            }
            Err(reason) => {
                warn!(device_id = %descriptor.id, error = %reason, "poll failed, marking session disconnected");
                session.invalidate(reason.clone());
                breaker.record_failure();
                if let Ok(mut guard) = status.write() {
                    guard.connected = false;
                    guard.last_error = Some(reason);
                }

                let attempt = 1;
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(backoff.delay_for_attempt(attempt)) => {}
                }
            }
        }
    }
}

/// One poll iteration: handshake if disconnected, fetch device info
/// and energy usage, publish a reading.
async fn poll_once(
    client: &TapoClient,
    descriptor: &DeviceDescriptor,
    session: &mut DeviceSession,
    sinks: &[Arc<dyn ReadingSink>],
) -> Result<(), String> {
    if !session.handshake_complete {
        client.connect(session).await.map_err(|e| e.to_string())?;
    }

    let info = client.get_device_info(session).await.map_err(|e| e.to_string())?;
    let usage = client.get_energy_usage(session).await.map_err(|e| e.to_string())?;
    session.last_success_at = Some(Utc::now());

    let reading = EnergyReading {
        device_id: descriptor.id.clone(),
        device_name: descriptor.name.clone(),
        room_id: descriptor.room_id.clone(),
        power_w: usage.current_power_w,
        energy_wh: usage.today_energy_wh,
        is_on: info.is_on,
        signal_strength: info.rssi,
        timestamp: Utc::now().timestamp(),
    };

    for sink in sinks {
        if let Err(err) = sink.publish_reading(&reading).await {
            warn!(device_id = %descriptor.id, error = %err, "sink publish failed, continuing");
        }
    }

    Ok(())
}

/// Handles a `set_state` command. Reconnects first if the session has lapsed —
/// a `set_state` call is as much a caller-visible operation as a poll
/// tick and shouldn't fail just because the last poll invalidated the
/// session.
async fn set_on_once(
    client: &TapoClient,
    descriptor: &DeviceDescriptor,
    session: &mut DeviceSession,
    on: bool,
) -> Result<(), String> {
    if !session.handshake_complete {
        client.connect(session).await.map_err(|e| e.to_string())?;
    }
    client.set_on(session, on).await.map_err(|e| e.to_string())
}
