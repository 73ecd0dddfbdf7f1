//! # Key Derivation
//!
//! Per-message data keys are derived with BLAKE3 in key-derivation mode from
//! the owner's master key and the message salt.

use crate::symmetric::SecretKey;

/// Domain separation string for envelope data keys.
pub const ENVELOPE_KDF_CONTEXT: &str = "versioned-pipeline 2024 envelope data key";

/// Length of the random salt in bytes.
pub const SALT_LEN: usize = 16;

/// Derive the data key for one message.
pub fn derive_message_key(master: &SecretKey, salt: &[u8]) -> SecretKey {
    let mut hasher = blake3::Hasher::new_derive_key(ENVELOPE_KDF_CONTEXT);
    hasher.update(master.as_bytes());
    hasher.update(salt);
    SecretKey::from_bytes(*hasher.finalize().as_bytes())
}

/// Generate a fresh random salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut salt);
    salt
}
