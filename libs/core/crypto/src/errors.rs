// [libs/core/crypto/src/errors.rs]
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("AEAD seal failed")]
    SealFailed,

    #[error("AEAD open failed: ciphertext is not authentic or the key/nonce is wrong")]
    OpenFailed,

    #[error("RSA key generation failed: {0}")]
    KeyGenFailed(String),

    #[error("PEM encoding of public key failed: {0}")]
    PemEncodeFailed(String),

    #[error("base64 decode failed: {0}")]
    Base64DecodeFailed(#[from] base64::DecodeError),
}
