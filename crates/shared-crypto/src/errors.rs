//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed (wrong key, tampered ciphertext or wrong nonce)
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// A salt, iv or ciphertext field is not valid hex
    #[error("Invalid {field} encoding: {reason}")]
    InvalidEncoding {
        /// Name of the offending field
        field: &'static str,
        /// Decoder message
        reason: String,
    },

    /// Invalid key length
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Invalid nonce length
    #[error("Invalid nonce length: expected {expected}, got {actual}")]
    InvalidNonceLength {
        /// Expected nonce length in bytes
        expected: usize,
        /// Actual nonce length in bytes
        actual: usize,
    },

    /// No key is registered for the given owner
    #[error("No key registered for owner {0:?}")]
    UnknownOwner(String),

    /// Message carries no owner and the keyring has no default key
    #[error("No default key configured")]
    NoDefaultKey,

    /// Key configuration could not be parsed
    #[error("Invalid key configuration: {0}")]
    InvalidConfig(String),
}
