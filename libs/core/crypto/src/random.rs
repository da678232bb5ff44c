// [libs/core/crypto/src/random.rs]
//! Cryptographically strong random bytes — used for the KLAP
//! `local_seed` (16 bytes) among other things.

use rand::RngCore;

pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    buf
}
