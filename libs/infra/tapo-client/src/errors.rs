// [libs/infra/tapo-client/src/errors.rs]
//! Failure catalogue for both drivers. A decryption failure, an HTTP
//! non-200, and a non-zero plaintext `error_code` are distinct
//! failure signals — kept as distinct variants so a caller can match
//! on exactly the one it cares about (e.g. `InvalidCredentials` to
//! stop retrying a misconfigured device).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TapoError {
    #[error("transport error contacting device: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("device returned non-success HTTP status: {0}")]
    HttpStatus(u16),

    #[error("device-side error_code {0} in response")]
    DeviceErrorCode(i64),

    #[error("invalid credentials or protocol mismatch (error_code 1003)")]
    InvalidCredentials,

    #[error("KLAP handshake hash verification failed")]
    HandshakeHashMismatch,

    #[error("AEAD seal/open failed, session invalidated")]
    CryptoFailure(#[from] fabric_core_crypto::CryptoError),

    #[error("malformed JSON response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("session not established, handshake required")]
    NotConnected,

    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
}

impl TapoError {
    /// Maps a driver-level failure onto the shared cross-subsystem
    /// taxonomy so the polling service can triage uniformly across
    /// both drivers.
    pub fn into_fabric_error(self) -> fabric_shared_errors::FabricError {
        use fabric_shared_errors::{ErrorKind, FabricError};

        match self {
            TapoError::Transport(err) => FabricError::connection(err.to_string()),
            TapoError::HttpStatus(status) => FabricError::connection(format!("http status {status}")),
            TapoError::InvalidCredentials => FabricError::auth("invalid credentials (error_code 1003)"),
            TapoError::HandshakeHashMismatch => FabricError::auth("klap handshake hash mismatch"),
            TapoError::CryptoFailure(err) => FabricError::new(ErrorKind::Protocol, fabric_shared_errors::Severity::High, err.to_string()),
            TapoError::DeviceErrorCode(code) => FabricError::device(format!("device error_code {code}")),
            TapoError::Decode(err) => FabricError::protocol(err.to_string()),
            TapoError::NotConnected => FabricError::device("session not established"),
            TapoError::UnexpectedShape(msg) => FabricError::protocol(msg),
        }
    }
}
