// [libs/core/crypto/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CRYPTO PRIMITIVES
 * CLASIFICACION: CORE (ESTRATO L1)
 * RESPONSABILIDAD: ALGORITMOS FIJOS PARA LOS DRIVERS TAPO
 *
 * No algorithm choice is exposed to callers: every
 * consumer of this crate gets SHA-1, SHA-256, AES-128-GCM, RSA-1024
 * and nothing else. The KLAP and Legacy drivers in
 * `fabric-infra-tapo-client` are the only intended callers; keeping
 * the primitive set closed here is what lets that crate stay a
 * straight-line implementation of the wire spec instead of a
 * configuration surface.
 * =================================================================
 */

mod aead;
mod encoding;
mod errors;
mod hash;
mod random;
mod rsa_keys;

pub use aead::{aes128_gcm_open, aes128_gcm_seal};
pub use encoding::{base64_decode, base64_encode};
pub use errors::CryptoError;
pub use hash::{sha1, sha256};
pub use random::random_bytes;
pub use rsa_keys::{generate_rsa1024_keypair, RsaKeyPair};

/// Constant-time byte comparison. Used to verify MACs/hashes without
/// leaking timing information through an early-exit `==`.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    use subtle::ConstantTimeEq;
    a.len() == b.len() && bool::from(a.ct_eq(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_time_eq_matches_equal_slices() {
        assert!(constant_time_eq(b"abcdef", b"abcdef"));
    }

    #[test]
    fn constant_time_eq_rejects_single_bit_difference() {
        assert!(!constant_time_eq(b"abcdef", b"abcdeg"));
    }

    #[test]
    fn constant_time_eq_rejects_length_mismatch() {
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }
}
