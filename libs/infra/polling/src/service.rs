// [libs/infra/polling/src/service.rs]
/*!
 * =================================================================
 * APARATO: POLLING SERVICE
 * CLASIFICACION: INFRASTRUCTURE (ESTRATO L3)
 * RESPONSABILIDAD: ORQUESTAR N POLLERS DE DISPOSITIVO CONCURRENTES
 *
 * Owns a mapping `device-id -> { descriptor, status, command sender,
 * task handle }`. `start()` launches one poller per
 * registered device; `stop()` cancels the shared token and awaits
 * every handle in a `JoinSet` with a bounded shutdown timeout.
 * =================================================================
 */

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use fabric_domain_models::device::DeviceDescriptor;
use fabric_shared_errors::FabricError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::poller::{run_poller, PollerCommand};
use crate::sink::ReadingSink;
use crate::status::DeviceStatus;

const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

struct RegisteredDevice {
    descriptor: DeviceDescriptor,
    status: Arc<RwLock<DeviceStatus>>,
    commands: mpsc::Sender<PollerCommand>,
}

pub struct PollingService {
    devices: RwLock<HashMap<String, RegisteredDevice>>,
    sinks: Vec<Arc<dyn ReadingSink>>,
    cancel: CancellationToken,
    tasks: tokio::sync::Mutex<JoinSet<()>>,
    shutdown_timeout: Duration,
}

impl PollingService {
    pub fn new(sinks: Vec<Arc<dyn ReadingSink>>) -> Self {
        Self {
            devices: RwLock::new(HashMap::new()),
            sinks,
            cancel: CancellationToken::new(),
            tasks: tokio::sync::Mutex::new(JoinSet::new()),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    /// Registers a device. Duplicate ids are rejected rather than
    /// silently overwriting an existing poller's session state.
    pub fn add(&self, descriptor: DeviceDescriptor) -> Result<(), FabricError> {
        let mut devices = self.devices.write().expect("devices lock poisoned");
        if devices.contains_key(&descriptor.id) {
            return Err(FabricError::validation(format!("device id {} already registered", descriptor.id)));
        }

        let (commands, _receiver_placeholder) = mpsc::channel(8);
        // the real receiver is created and handed to the poller task in
        // `start()`/`spawn_one`; until then we keep a sender here so
        // `add()` can be called before or after `start()` uniformly.
        drop(_receiver_placeholder);

        devices.insert(
            descriptor.id.clone(),
            RegisteredDevice {
                descriptor,
                status: Arc::new(RwLock::new(DeviceStatus::default())),
                commands,
            },
        );
        Ok(())
    }

    pub fn remove(&self, id: &str) -> Result<(), FabricError> {
        let mut devices = self.devices.write().expect("devices lock poisoned");
        devices
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| FabricError::validation(format!("device id {id} not registered")))
    }

    /// Sends a `SetOn` command to the device's running poller and
    /// awaits its reply. Requires `start()` to have been called for
    /// this device — a poller that never started has no command
    /// receiver reading the channel, and the send will fail.
    pub async fn set_state(&self, id: &str, on: bool) -> Result<(), FabricError> {
        let sender = {
            let devices = self.devices.read().expect("devices lock poisoned");
            devices
                .get(id)
                .map(|device| device.commands.clone())
                .ok_or_else(|| FabricError::validation(format!("device id {id} not registered")))?
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        sender
            .send(PollerCommand::SetOn(on, reply_tx))
            .await
            .map_err(|_| FabricError::device(format!("poller for {id} is not running")))?;

        reply_rx
            .await
            .map_err(|_| FabricError::device(format!("poller for {id} dropped the reply channel")))?
            .map_err(FabricError::device)
    }

    pub fn status(&self) -> HashMap<String, DeviceStatus> {
        let devices = self.devices.read().expect("devices lock poisoned");
        devices
            .iter()
            .map(|(id, device)| (id.clone(), device.status.read().expect("status lock poisoned").clone()))
            .collect()
    }

    /// Spawns one poller per currently registered device.
    #[instrument(skip(self))]
    pub async fn start(&self) {
        let snapshot: Vec<(String, DeviceDescriptor, Arc<RwLock<DeviceStatus>>)> = {
            let devices = self.devices.read().expect("devices lock poisoned");
            devices
                .iter()
                .map(|(id, device)| (id.clone(), device.descriptor.clone(), device.status.clone()))
                .collect()
        };

        let mut tasks = self.tasks.lock().await;
        for (id, descriptor, status) in snapshot {
            let (commands_tx, commands_rx) = mpsc::channel(8);
            {
                let mut devices = self.devices.write().expect("devices lock poisoned");
                if let Some(device) = devices.get_mut(&id) {
                    device.commands = commands_tx;
                }
            }

            let sinks = self.sinks.clone();
            let cancel = self.cancel.clone();
            info!(device_id = %id, "starting poller");
            tasks.spawn(run_poller(descriptor, sinks, cancel, status, commands_rx));
        }
    }

    /// Idempotent: a second call observes the token already cancelled
    /// and simply re-awaits any still-running tasks (there should be
    /// none after the first successful stop).
    #[instrument(skip(self))]
    pub async fn stop(&self) {
        self.cancel.cancel();

        let mut tasks = self.tasks.lock().await;
        let deadline = tokio::time::sleep(self.shutdown_timeout);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                joined = tasks.join_next() => {
                    match joined {
                        Some(_) => continue,
                        None => break,
                    }
                }
                _ = &mut deadline => {
                    warn!("polling service shutdown timed out with pollers still running");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_descriptor(id: &str) -> DeviceDescriptor {
        DeviceDescriptor {
            id: id.to_string(),
            name: "Test Plug".into(),
            room_id: "office".into(),
            ip_address: "192.0.2.1".into(),
            username: "user".into(),
            password: "pass".into(),
            driver: fabric_domain_models::device::DriverKind::Klap,
            poll_period_secs: 30,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn adding_duplicate_device_id_is_rejected() {
        let service = PollingService::new(vec![]);
        service.add(sample_descriptor("plug-1")).expect("first add succeeds");

        let result = service.add(sample_descriptor("plug-1"));
        assert!(result.is_err());
    }

    #[test]
    fn removing_unregistered_device_is_an_error() {
        let service = PollingService::new(vec![]);
        assert!(service.remove("nonexistent").is_err());
    }

    #[test]
    fn status_reflects_registered_devices() {
        let service = PollingService::new(vec![]);
        service.add(sample_descriptor("plug-1")).unwrap();
        service.add(sample_descriptor("plug-2")).unwrap();

        let status = service.status();
        assert_eq!(status.len(), 2);
        assert!(!status["plug-1"].connected);
    }

    #[tokio::test]
    async fn stop_without_start_returns_promptly() {
        let service = PollingService::new(vec![]);
        service.add(sample_descriptor("plug-1")).unwrap();
        service.stop().await;
    }
}
