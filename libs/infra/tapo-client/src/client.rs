// [libs/infra/tapo-client/src/client.rs]
/*!
 * =================================================================
 * APARATO: TAPO DEVICE CLIENT
 * CLASIFICACION: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: UNIFICAR LOS DRIVERS LEGACY Y KLAP
 *
 * `TapoClient` is the single entry point the polling service talks
 * to. It owns one `reqwest::Client` (with its own cookie jar, so KLAP
 * handshake cookies never leak across devices) and dispatches every
 * call to whichever driver the device descriptor selects, without
 * leaking either driver's internals across the `DeviceClient` seam.
 * =================================================================
 */

use std::time::Duration;

use async_trait::async_trait;
use fabric_domain_models::device::{DeviceDescriptor, DeviceInfo, DeviceSession, DriverKind, EnergyUsage};
use reqwest::Client;

use crate::errors::TapoError;
use crate::{klap, legacy};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The uniform capability set both drivers expose.
#[async_trait]
pub trait DeviceClient: Send + Sync {
    async fn connect(&self, session: &mut DeviceSession) -> Result<(), TapoError>;
    async fn get_device_info(&self, session: &mut DeviceSession) -> Result<DeviceInfo, TapoError>;
    async fn get_energy_usage(&self, session: &mut DeviceSession) -> Result<EnergyUsage, TapoError>;
    async fn set_on(&self, session: &mut DeviceSession, on: bool) -> Result<(), TapoError>;
}

pub struct TapoClient {
    http: Client,
    base_url: String,
    username: String,
    password: String,
    driver: DriverKind,
}

impl TapoClient {
    pub fn new(descriptor: &DeviceDescriptor) -> Self {
        let http = Client::builder()
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .user_agent("fabric-node/tapo-client")
            .build()
            .expect("reqwest client construction with static config cannot fail");

        Self {
            http,
            base_url: format!("http://{}", descriptor.ip_address),
            username: descriptor.username.clone(),
            password: descriptor.password.clone(),
            driver: descriptor.driver,
        }
    }
}

#[async_trait]
impl DeviceClient for TapoClient {
    async fn connect(&self, session: &mut DeviceSession) -> Result<(), TapoError> {
        match self.driver {
            DriverKind::Legacy => {
                let token = legacy::handshake_and_login(&self.http, &self.base_url, &self.username, &self.password).await?;
                session.token_or_cookie = Some(token);
            }
            DriverKind::Klap => {
                let (session_key, iv_base) = klap::handshake(&self.http, &self.base_url, &self.username, &self.password).await?;
                session.session_key = Some(session_key);
                session.iv_base = Some(iv_base);
                session.sequence = 0;
            }
        }
        session.handshake_complete = true;
        session.last_error = None;
        Ok(())
    }

    async fn get_device_info(&self, session: &mut DeviceSession) -> Result<DeviceInfo, TapoError> {
        if !session.handshake_complete {
            return Err(TapoError::NotConnected);
        }
        match self.driver {
            DriverKind::Legacy => legacy::get_device_info(&self.http, &self.base_url, session).await,
            DriverKind::Klap => klap::get_device_info(&self.http, &self.base_url, session).await,
        }
    }

    async fn get_energy_usage(&self, session: &mut DeviceSession) -> Result<EnergyUsage, TapoError> {
        if !session.handshake_complete {
            return Err(TapoError::NotConnected);
        }
        match self.driver {
            DriverKind::Legacy => legacy::get_energy_usage(&self.http, &self.base_url, session).await,
            DriverKind::Klap => klap::get_energy_usage(&self.http, &self.base_url, session).await,
        }
    }

    async fn set_on(&self, session: &mut DeviceSession, on: bool) -> Result<(), TapoError> {
        if !session.handshake_complete {
            return Err(TapoError::NotConnected);
        }
        match self.driver {
            DriverKind::Legacy => legacy::set_on(&self.http, &self.base_url, session, on).await,
            DriverKind::Klap => klap::set_on(&self.http, &self.base_url, session, on).await,
        }
    }
}
