// [libs/core/crypto/src/aead.rs]
//! AES-128-GCM seal/open. KLAP uses a 12-byte nonce built from
//! `iv_base[:8] || big_endian_uint32(seq)`; constructing that nonce is
//! the caller's job (`fabric-infra-tapo-client`), this module only
//! performs the AEAD operation itself.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Key, Nonce};

use crate::errors::CryptoError;

/// Seals `plaintext` under `key` (16 bytes) and `nonce` (12 bytes),
/// returning ciphertext with the authentication tag appended.
pub fn aes128_gcm_seal(key: &[u8; 16], nonce: &[u8; 12], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes128Gcm::new(Key::<Aes128Gcm>::from_slice(key));
    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|_| CryptoError::SealFailed)
}

/// Opens `ciphertext` (with trailing tag) under `key` and `nonce`.
/// Any authentication failure — wrong key, wrong nonce (stale
/// sequence number), or tampered bytes — is reported uniformly as
/// `CryptoError::OpenFailed`; the caller (KLAP driver) treats this as
/// an invalidated session requiring reconnect, never a retry in place.
pub fn aes128_gcm_open(key: &[u8; 16], nonce: &[u8; 12], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes128Gcm::new(Key::<Aes128Gcm>::from_slice(key));
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::OpenFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_then_open_roundtrips() {
        let key = [0x42u8; 16];
        let nonce = [0x01u8; 12];
        let plaintext = br#"{"method":"get_device_info","params":{}}"#;

        let ciphertext = aes128_gcm_seal(&key, &nonce, plaintext).expect("seal");
        let recovered = aes128_gcm_open(&key, &nonce, &ciphertext).expect("open");

        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn open_fails_on_wrong_key() {
        let key_a = [0x11u8; 16];
        let key_b = [0x22u8; 16];
        let nonce = [0x00u8; 12];

        let ciphertext = aes128_gcm_seal(&key_a, &nonce, b"hello").expect("seal");
        assert!(aes128_gcm_open(&key_b, &nonce, &ciphertext).is_err());
    }

    #[test]
    fn open_fails_on_tampered_ciphertext() {
        let key = [0x33u8; 16];
        let nonce = [0x00u8; 12];

        let mut ciphertext = aes128_gcm_seal(&key, &nonce, b"hello world").expect("seal");
        let last = ciphertext.len() - 1;
        ciphertext[last] ^= 0xFF;

        assert!(aes128_gcm_open(&key, &nonce, &ciphertext).is_err());
    }

    #[test]
    fn open_fails_on_stale_sequence_nonce() {
        // simulates replaying a response encrypted under seq=1 against
        // a nonce advanced to seq=2
        let key = [0x55u8; 16];
        let nonce_seq1 = [0u8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1];
        let nonce_seq2 = [0u8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2];

        let ciphertext = aes128_gcm_seal(&key, &nonce_seq1, b"reading").expect("seal");
        assert!(aes128_gcm_open(&key, &nonce_seq2, &ciphertext).is_err());
    }
}
