// [libs/core/crypto/src/rsa_keys.rs]
//! RSA-1024 keypair generation and PKIX public-key PEM marshalling,
//! used by the Legacy driver's handshake step: the
//! client generates a fresh keypair per handshake and sends the
//! PEM-encoded, base64-wrapped public key to the device.

use rsa::pkcs8::{EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::errors::CryptoError;

const RSA_KEY_BITS: usize = 1024;

pub struct RsaKeyPair {
    pub private_key: RsaPrivateKey,
    pub public_key: RsaPublicKey,
}

impl RsaKeyPair {
    /// PKIX (SubjectPublicKeyInfo) PEM encoding of the public key, the
    /// shape the Legacy handshake's `params.key` field expects.
    pub fn public_key_pem(&self) -> Result<String, CryptoError> {
        self.public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CryptoError::PemEncodeFailed(e.to_string()))
    }
}

pub fn generate_rsa1024_keypair() -> Result<RsaKeyPair, CryptoError> {
    let mut rng = rand::rngs::OsRng;
    let private_key = RsaPrivateKey::new(&mut rng, RSA_KEY_BITS)
        .map_err(|e| CryptoError::KeyGenFailed(e.to_string()))?;
    let public_key = RsaPublicKey::from(&private_key);

    Ok(RsaKeyPair {
        private_key,
        public_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_a_usable_keypair_and_pem() {
        let keypair = generate_rsa1024_keypair().expect("keygen");
        let pem = keypair.public_key_pem().expect("pem encode");

        assert!(pem.starts_with("-----BEGIN PUBLIC KEY-----"));
        assert!(pem.trim_end().ends_with("-----END PUBLIC KEY-----"));
    }

    #[test]
    fn two_keypairs_are_distinct() {
        let a = generate_rsa1024_keypair().expect("keygen a");
        let b = generate_rsa1024_keypair().expect("keygen b");
        assert_ne!(a.public_key_pem().unwrap(), b.public_key_pem().unwrap());
    }
}
