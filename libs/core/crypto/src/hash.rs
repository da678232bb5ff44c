// [libs/core/crypto/src/hash.rs]
//! SHA-1 and SHA-256 digests. KLAP's auth hash chains both:
//! `SHA256(SHA1(username) || SHA1(password))`.

use sha1::Sha1;
use sha2::{Digest, Sha256};

/// 20-byte SHA-1 digest.
pub fn sha1(data: &[u8]) -> [u8; 20] {
    let mut hasher = Sha1::new();
    hasher.update(data);
    let mut out = [0u8; 20];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// 32-byte SHA-256 digest.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_of_empty_string_matches_known_vector() {
        let digest = sha1(b"");
        assert_eq!(hex::encode(digest), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn sha256_of_empty_string_matches_known_vector() {
        let digest = sha256(b"");
        assert_eq!(
            hex::encode(digest),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256_is_deterministic() {
        assert_eq!(sha256(b"tapo"), sha256(b"tapo"));
        assert_ne!(sha256(b"tapo"), sha256(b"Tapo"));
    }
}
