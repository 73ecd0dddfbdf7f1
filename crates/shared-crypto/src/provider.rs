//! # Crypto Provider Contract
//!
//! What the pipeline needs from an encryption backend. The pipeline never
//! inspects salt, iv or ciphertext; it copies them into and out of envelopes.

use crate::CryptoError;

/// Inputs to one encryption call beyond the plaintext.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncryptionContext {
    /// Owner whose key encrypts the message. Copied to `owner_info`.
    pub owner_info: Option<String>,
}

impl EncryptionContext {
    /// Context for a specific owner.
    pub fn for_owner(owner: impl Into<String>) -> Self {
        Self {
            owner_info: Some(owner.into()),
        }
    }
}

/// Output of one encryption call, ready to be copied into an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedMessage {
    /// Key-derivation material.
    pub salt: String,
    /// Initialization vector.
    pub iv: String,
    /// Encrypted bytes, encoded as text.
    pub ciphertext: String,
    /// Owner whose key was used.
    pub owner_info: Option<String>,
}

/// Symmetric encryption backend.
///
/// Implementations own their randomness; salt and iv need not be
/// deterministic. Both calls may block.
pub trait CryptoProvider: Send + Sync {
    /// Encrypt a serialized payload.
    ///
    /// # Errors
    ///
    /// Any failure to resolve a key or seal the plaintext.
    fn encrypt(
        &self,
        plaintext: &[u8],
        context: &EncryptionContext,
    ) -> Result<SealedMessage, CryptoError>;

    /// Decrypt a payload previously sealed by a compatible provider.
    ///
    /// # Errors
    ///
    /// Any failure to decode the fields, resolve the key or open the
    /// ciphertext.
    fn decrypt(
        &self,
        salt: &str,
        iv: &str,
        ciphertext: &str,
        owner_info: Option<&str>,
    ) -> Result<Vec<u8>, CryptoError>;
}

impl<T: CryptoProvider + ?Sized> CryptoProvider for std::sync::Arc<T> {
    fn encrypt(
        &self,
        plaintext: &[u8],
        context: &EncryptionContext,
    ) -> Result<SealedMessage, CryptoError> {
        (**self).encrypt(plaintext, context)
    }

    fn decrypt(
        &self,
        salt: &str,
        iv: &str,
        ciphertext: &str,
        owner_info: Option<&str>,
    ) -> Result<Vec<u8>, CryptoError> {
        (**self).decrypt(salt, iv, ciphertext, owner_info)
    }
}
