//! # Default Provider
//!
//! `XChaChaProvider` seals payloads with XChaCha20-Poly1305 under a data key
//! derived from the owner's master key and a random salt. Salt, nonce and
//! ciphertext are hex-encoded for the envelope's string fields.

use crate::kdf::{derive_message_key, generate_salt};
use crate::keyring::Keyring;
use crate::provider::{CryptoProvider, EncryptionContext, SealedMessage};
use crate::symmetric::{self, Nonce};
use crate::CryptoError;
use tracing::trace;

/// Keyring-backed XChaCha20-Poly1305 provider.
#[derive(Debug, Clone)]
pub struct XChaChaProvider {
    keyring: Keyring,
}

impl XChaChaProvider {
    /// Create a provider over a keyring.
    pub fn new(keyring: Keyring) -> Self {
        Self { keyring }
    }

    /// Provider with a single default key.
    pub fn with_default_key(key: symmetric::SecretKey) -> Self {
        Self::new(Keyring::new().with_default_key(key))
    }

    /// The underlying keyring.
    pub fn keyring(&self) -> &Keyring {
        &self.keyring
    }
}

fn decode_field(field: &'static str, value: &str) -> Result<Vec<u8>, CryptoError> {
    hex::decode(value).map_err(|e| CryptoError::InvalidEncoding {
        field,
        reason: e.to_string(),
    })
}

impl CryptoProvider for XChaChaProvider {
    fn encrypt(
        &self,
        plaintext: &[u8],
        context: &EncryptionContext,
    ) -> Result<SealedMessage, CryptoError> {
        let owner = context.owner_info.as_deref();
        let master = self.keyring.key_for(owner)?;

        let salt = generate_salt();
        let data_key = derive_message_key(master, &salt);
        let (ciphertext, nonce) = symmetric::encrypt(&data_key, plaintext)?;

        trace!(owner = ?owner, bytes = plaintext.len(), "Payload sealed");

        Ok(SealedMessage {
            salt: hex::encode(salt),
            iv: hex::encode(nonce.as_bytes()),
            ciphertext: hex::encode(ciphertext),
            owner_info: context.owner_info.clone(),
        })
    }

    fn decrypt(
        &self,
        salt: &str,
        iv: &str,
        ciphertext: &str,
        owner_info: Option<&str>,
    ) -> Result<Vec<u8>, CryptoError> {
        let salt = decode_field("salt", salt)?;
        let nonce = Nonce::from_slice(&decode_field("iv", iv)?)?;
        let ciphertext = decode_field("ciphertext", ciphertext)?;

        let master = self.keyring.key_for(owner_info)?;
        let data_key = derive_message_key(master, &salt);

        symmetric::decrypt(&data_key, &ciphertext, &nonce)
    }
}
