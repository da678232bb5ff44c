// [libs/infra/tapo-client/src/legacy.rs]
//! Legacy RSA/base64 Tapo driver: handshake negotiates
//! an RSA-1024 keypair, `login_device` trades base64 credentials for a
//! bearer token, and every subsequent call is plain JSON POSTed to
//! `/app?token=<token>`.

use fabric_core_crypto::{base64_encode, generate_rsa1024_keypair};
use fabric_domain_models::device::{DeviceInfo, DeviceSession, EnergyUsage};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::instrument;

use crate::errors::TapoError;

const LEGACY_ERROR_CODE_INVALID_CREDENTIALS: i64 = 1003;

#[derive(Deserialize)]
struct LegacyEnvelope {
    error_code: i64,
    #[serde(default)]
    result: Value,
}

fn check_error_code(code: i64) -> Result<(), TapoError> {
    if code == 0 {
        Ok(())
    } else if code == LEGACY_ERROR_CODE_INVALID_CREDENTIALS {
        Err(TapoError::InvalidCredentials)
    } else {
        Err(TapoError::DeviceErrorCode(code))
    }
}

/// Runs the two-step handshake/login and returns the bearer token.
/// A generated keypair is used once per handshake and discarded —
/// the Legacy driver never persists it.
#[instrument(skip(http, base_url, username, password))]
pub async fn handshake_and_login(
    http: &Client,
    base_url: &str,
    username: &str,
    password: &str,
) -> Result<String, TapoError> {
    let keypair = generate_rsa1024_keypair().map_err(TapoError::CryptoFailure)?;
    let public_key_pem = keypair.public_key_pem().map_err(TapoError::CryptoFailure)?;

    let handshake_body = json!({
        "method": "handshake",
        "params": { "key": base64_encode(public_key_pem.as_bytes()) }
    });

    let response = http
        .post(format!("{base_url}/app"))
        .json(&handshake_body)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(TapoError::HttpStatus(response.status().as_u16()));
    }

    let envelope: LegacyEnvelope = response.json().await.map_err(TapoError::Transport)?;
    check_error_code(envelope.error_code)?;

    let login_body = json!({
        "method": "login_device",
        "params": {
            "username": base64_encode(username.as_bytes()),
            "password": base64_encode(password.as_bytes()),
        }
    });

    let response = http
        .post(format!("{base_url}/app"))
        .json(&login_body)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(TapoError::HttpStatus(response.status().as_u16()));
    }

    let envelope: LegacyEnvelope = response.json().await.map_err(TapoError::Transport)?;
    check_error_code(envelope.error_code)?;

    envelope
        .result
        .get("token")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| TapoError::UnexpectedShape("login_device response missing result.token".into()))
}

/// Authenticated call: `POST /app?token=<token>` with `{"method","params"}`.
#[instrument(skip(http, base_url, session, params))]
async fn authenticated_call(
    http: &Client,
    base_url: &str,
    session: &DeviceSession,
    method: &str,
    params: Value,
) -> Result<Value, TapoError> {
    let token = session.token_or_cookie.as_deref().ok_or(TapoError::NotConnected)?;

    let body = json!({ "method": method, "params": params });
    let response = http
        .post(format!("{base_url}/app?token={token}"))
        .json(&body)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(TapoError::HttpStatus(response.status().as_u16()));
    }

    let envelope: LegacyEnvelope = response.json().await.map_err(TapoError::Transport)?;
    check_error_code(envelope.error_code)?;
    Ok(envelope.result)
}

pub async fn get_device_info(http: &Client, base_url: &str, session: &DeviceSession) -> Result<DeviceInfo, TapoError> {
    let result = authenticated_call(http, base_url, session, "get_device_info", json!({})).await?;

    Ok(DeviceInfo {
        device_id: result.get("device_id").and_then(Value::as_str).unwrap_or_default().to_string(),
        model: result.get("model").and_then(Value::as_str).unwrap_or_default().to_string(),
        firmware_version: result.get("fw_ver").and_then(Value::as_str).unwrap_or_default().to_string(),
        is_on: result.get("device_on").and_then(Value::as_bool).unwrap_or(false),
        rssi: result.get("rssi").and_then(Value::as_i64).unwrap_or(0) as i32,
        signal_level: result.get("signal_level").and_then(Value::as_u64).unwrap_or(0) as u8,
    })
}

pub async fn get_energy_usage(http: &Client, base_url: &str, session: &DeviceSession) -> Result<EnergyUsage, TapoError> {
    let result = authenticated_call(http, base_url, session, "get_energy_usage", json!({})).await?;

    let current_power_mw = result.get("current_power").and_then(Value::as_f64).unwrap_or(0.0);
    Ok(EnergyUsage {
        current_power_w: current_power_mw / 1000.0,
        today_energy_wh: result.get("today_energy").and_then(Value::as_f64).unwrap_or(0.0),
        month_energy_wh: result.get("month_energy").and_then(Value::as_f64).unwrap_or(0.0),
        runtime_minutes: result.get("today_runtime").and_then(Value::as_u64).unwrap_or(0),
    })
}

pub async fn set_on(http: &Client, base_url: &str, session: &DeviceSession, on: bool) -> Result<(), TapoError> {
    authenticated_call(http, base_url, session, "set_device_info", json!({ "device_on": on })).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_error_code_is_ok() {
        assert!(check_error_code(0).is_ok());
    }

    #[test]
    fn error_code_1003_maps_to_invalid_credentials() {
        assert!(matches!(check_error_code(1003), Err(TapoError::InvalidCredentials)));
    }

    #[test]
    fn other_nonzero_error_code_is_device_error() {
        match check_error_code(9999) {
            Err(TapoError::DeviceErrorCode(code)) => assert_eq!(code, 9999),
            _ => panic!("expected DeviceErrorCode"),
        }
    }
}
