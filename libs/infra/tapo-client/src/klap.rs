// [libs/infra/tapo-client/src/klap.rs]
//! KLAP driver: a two-phase handshake establishes a
//! shared session key and IV base, then every request/response body
//! is AES-128-GCM ciphertext under a nonce built from the IV base and
//! the monotonic sequence number. Cookies returned by handshake1 are
//! carried by the shared `reqwest::Client`'s cookie jar — the caller
//! builds that client with `cookie_store(true)` per device so this
//! module never has to thread a cookie header by hand.

use fabric_core_crypto::{aes128_gcm_open, aes128_gcm_seal, constant_time_eq, random_bytes, sha1, sha256};
use fabric_domain_models::device::{DeviceInfo, DeviceSession, EnergyUsage};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::instrument;

use crate::errors::TapoError;

const SEED_LEN: usize = 16;

fn auth_hash(username: &str, password: &str) -> [u8; 32] {
    let mut input = Vec::with_capacity(40);
    input.extend_from_slice(&sha1(username.as_bytes()));
    input.extend_from_slice(&sha1(password.as_bytes()));
    sha256(&input)
}

fn derive_session_key(local_seed: &[u8], remote_seed: &[u8], auth_hash: &[u8; 32]) -> [u8; 16] {
    let mut input = Vec::with_capacity(3 + local_seed.len() + remote_seed.len() + auth_hash.len());
    input.extend_from_slice(b"lsk");
    input.extend_from_slice(local_seed);
    input.extend_from_slice(remote_seed);
    input.extend_from_slice(auth_hash);
    let digest = sha256(&input);
    let mut key = [0u8; 16];
    key.copy_from_slice(&digest[..16]);
    key
}

fn derive_iv_base(local_seed: &[u8], remote_seed: &[u8], auth_hash: &[u8; 32]) -> [u8; 12] {
    let mut input = Vec::with_capacity(2 + local_seed.len() + remote_seed.len() + auth_hash.len());
    input.extend_from_slice(b"iv");
    input.extend_from_slice(local_seed);
    input.extend_from_slice(remote_seed);
    input.extend_from_slice(auth_hash);
    let digest = sha256(&input);
    let mut iv = [0u8; 12];
    iv.copy_from_slice(&digest[..12]);
    iv
}

fn build_nonce(iv_base: &[u8; 12], seq: u32) -> [u8; 12] {
    let mut nonce = [0u8; 12];
    nonce[..8].copy_from_slice(&iv_base[..8]);
    nonce[8..].copy_from_slice(&seq.to_be_bytes());
    nonce
}

/// Runs handshake1/handshake2 and returns the derived `(session_key,
/// iv_base)` pair. Any hash mismatch or non-200 leaves no session
/// state — the caller must not persist partial material on error.
#[instrument(skip(http, base_url, username, password))]
pub async fn handshake(
    http: &Client,
    base_url: &str,
    username: &str,
    password: &str,
) -> Result<([u8; 16], [u8; 12]), TapoError> {
    let local_seed: [u8; SEED_LEN] = random_bytes(SEED_LEN).try_into().expect("random_bytes(16) has len 16");
    let auth_hash = auth_hash(username, password);

    let response = http
        .post(format!("{base_url}/app/handshake1"))
        .header("Content-Type", "application/octet-stream")
        .body(local_seed.to_vec())
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(TapoError::HttpStatus(response.status().as_u16()));
    }

    let body = response.bytes().await.map_err(TapoError::Transport)?;
    if body.len() != 32 {
        return Err(TapoError::UnexpectedShape(format!(
            "handshake1 response was {} bytes, expected 32",
            body.len()
        )));
    }

    let remote_seed = &body[..16];
    let server_hash = &body[16..32];

    let mut expected_input = Vec::with_capacity(16 + 16 + 32);
    expected_input.extend_from_slice(&local_seed);
    expected_input.extend_from_slice(remote_seed);
    expected_input.extend_from_slice(&auth_hash);
    let expected_hash = sha256(&expected_input);

    if !constant_time_eq(server_hash, &expected_hash[..16]) {
        return Err(TapoError::HandshakeHashMismatch);
    }

    let mut handshake2_input = Vec::with_capacity(16 + 16 + 32);
    handshake2_input.extend_from_slice(remote_seed);
    handshake2_input.extend_from_slice(&local_seed);
    handshake2_input.extend_from_slice(&auth_hash);
    let handshake2_payload = sha256(&handshake2_input);

    let response = http
        .post(format!("{base_url}/app/handshake2"))
        .header("Content-Type", "application/octet-stream")
        .body(handshake2_payload.to_vec())
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(TapoError::HttpStatus(response.status().as_u16()));
    }

    let session_key = derive_session_key(&local_seed, remote_seed, &auth_hash);
    let iv_base = derive_iv_base(&local_seed, remote_seed, &auth_hash);

    Ok((session_key, iv_base))
}

/// Encrypts `request_json`, posts it to `/app/request?seq=<seq>`,
/// decrypts the response. The sequence is advanced only after a
/// successful round-trip — the caller passes a `&mut
/// DeviceSession` so this function can both read and advance it.
#[instrument(skip(http, base_url, session, request_json))]
async fn encrypted_request(
    http: &Client,
    base_url: &str,
    session: &mut DeviceSession,
    request_json: Value,
) -> Result<Value, TapoError> {
    let session_key = session.session_key.ok_or(TapoError::NotConnected)?;
    let iv_base = session.iv_base.ok_or(TapoError::NotConnected)?;
    let seq = session.next_sequence();
    let nonce = build_nonce(&iv_base, seq);

    let plaintext = serde_json::to_vec(&request_json)?;
    let ciphertext = aes128_gcm_seal(&session_key, &nonce, &plaintext)?;

    let response = http
        .post(format!("{base_url}/app/request?seq={seq}"))
        .header("Content-Type", "application/octet-stream")
        .body(ciphertext)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(TapoError::HttpStatus(response.status().as_u16()));
    }

    let response_ciphertext = response.bytes().await.map_err(TapoError::Transport)?;
    let response_plaintext = aes128_gcm_open(&session_key, &nonce, &response_ciphertext)?;

    // only now, after a fully successful round-trip, does the sequence advance
    session.advance_sequence();

    let envelope: Value = serde_json::from_slice(&response_plaintext)?;
    let error_code = envelope.get("error_code").and_then(Value::as_i64).unwrap_or(0);
    if error_code == 1003 {
        return Err(TapoError::InvalidCredentials);
    } else if error_code != 0 {
        return Err(TapoError::DeviceErrorCode(error_code));
    }

    Ok(envelope.get("result").cloned().unwrap_or(Value::Null))
}

pub async fn get_device_info(http: &Client, base_url: &str, session: &mut DeviceSession) -> Result<DeviceInfo, TapoError> {
    let result = encrypted_request(http, base_url, session, json!({ "method": "get_device_info", "params": {} })).await?;

    Ok(DeviceInfo {
        device_id: result.get("device_id").and_then(Value::as_str).unwrap_or_default().to_string(),
        model: result.get("model").and_then(Value::as_str).unwrap_or_default().to_string(),
        firmware_version: result.get("fw_ver").and_then(Value::as_str).unwrap_or_default().to_string(),
        is_on: result.get("device_on").and_then(Value::as_bool).unwrap_or(false),
        rssi: result.get("rssi").and_then(Value::as_i64).unwrap_or(0) as i32,
        signal_level: result.get("signal_level").and_then(Value::as_u64).unwrap_or(0) as u8,
    })
}

pub async fn get_energy_usage(http: &Client, base_url: &str, session: &mut DeviceSession) -> Result<EnergyUsage, TapoError> {
    let result = encrypted_request(http, base_url, session, json!({ "method": "get_energy_usage", "params": {} })).await?;

    let current_power_mw = result.get("current_power").and_then(Value::as_f64).unwrap_or(0.0);
    Ok(EnergyUsage {
        current_power_w: current_power_mw / 1000.0,
        today_energy_wh: result.get("today_energy").and_then(Value::as_f64).unwrap_or(0.0),
        month_energy_wh: result.get("month_energy").and_then(Value::as_f64).unwrap_or(0.0),
        runtime_minutes: result.get("today_runtime").and_then(Value::as_u64).unwrap_or(0),
    })
}

pub async fn set_on(http: &Client, base_url: &str, session: &mut DeviceSession, on: bool) -> Result<(), TapoError> {
    encrypted_request(
        http,
        base_url,
        session,
        json!({ "method": "set_device_info", "params": { "device_on": on } }),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_hash_is_deterministic_and_32_bytes() {
        let a = auth_hash("alice", "hunter2");
        let b = auth_hash("alice", "hunter2");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn auth_hash_differs_for_different_credentials() {
        assert_ne!(auth_hash("alice", "hunter2"), auth_hash("alice", "hunter3"));
    }

    #[test]
    fn nonce_changes_only_in_sequence_bytes() {
        let iv_base = [7u8; 12];
        let nonce1 = build_nonce(&iv_base, 1);
        let nonce2 = build_nonce(&iv_base, 2);

        assert_eq!(&nonce1[..8], &nonce2[..8]);
        assert_ne!(&nonce1[8..], &nonce2[8..]);
        assert_eq!(&nonce1[8..], &1u32.to_be_bytes());
    }

    #[test]
    fn session_key_and_iv_base_derivation_is_deterministic() {
        let local = [1u8; 16];
        let remote = [2u8; 16];
        let hash = auth_hash("bob", "secret");

        let key_a = derive_session_key(&local, &remote, &hash);
        let key_b = derive_session_key(&local, &remote, &hash);
        assert_eq!(key_a, key_b);

        let iv_a = derive_iv_base(&local, &remote, &hash);
        let iv_b = derive_iv_base(&local, &remote, &hash);
        assert_eq!(iv_a, iv_b);
    }
}
