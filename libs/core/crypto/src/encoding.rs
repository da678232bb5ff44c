// [libs/core/crypto/src/encoding.rs]
//! Standard base64, used for the Legacy driver's username/password
//! fields and for PEM-wrapping the handshake public key.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::errors::CryptoError;

pub fn base64_encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

pub fn base64_decode(data: &str) -> Result<Vec<u8>, CryptoError> {
    STANDARD.decode(data).map_err(CryptoError::Base64DecodeFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_arbitrary_bytes() {
        let original = b"tapo-device-credentials";
        let encoded = base64_encode(original);
        let decoded = base64_decode(&encoded).expect("decode");
        assert_eq!(decoded, original);
    }

    #[test]
    fn decode_rejects_malformed_input() {
        assert!(base64_decode("not valid base64!!").is_err());
    }
}
