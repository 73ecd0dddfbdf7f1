//! # Keyring
//!
//! Resolves the master key for a message from its `owner_info`.
//!
//! ## Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `PIPELINE_SECRET_KEY` | 64 hex chars, key for messages without an owner |
//! | `PIPELINE_OWNER_KEYS` | `owner=hex,owner=hex` per-tenant keys |

use crate::symmetric::SecretKey;
use crate::CryptoError;
use std::collections::HashMap;
use std::env;

/// Raw key configuration as read from the environment.
///
/// `Debug` shows owner names and whether a default key is set, never key
/// material.
#[derive(Clone, Default)]
pub struct KeyringConfig {
    /// Hex-encoded default key.
    pub secret_key_hex: Option<String>,
    /// `(owner, hex key)` pairs.
    pub owner_keys: Vec<(String, String)>,
}

impl KeyringConfig {
    /// Read `PIPELINE_SECRET_KEY` and `PIPELINE_OWNER_KEYS`.
    ///
    /// Malformed `owner=key` pairs are kept as-is and rejected by `build()`.
    pub fn from_env() -> Self {
        let owner_keys = env::var("PIPELINE_OWNER_KEYS")
            .map(|raw| parse_owner_keys(&raw))
            .unwrap_or_default();

        Self {
            secret_key_hex: env::var("PIPELINE_SECRET_KEY").ok(),
            owner_keys,
        }
    }

    /// Parse every key.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidConfig` or `InvalidKeyLength` for any
    /// key that does not parse, or an owner entry with an empty name.
    pub fn build(&self) -> Result<Keyring, CryptoError> {
        let mut keyring = Keyring::new();

        if let Some(hex) = &self.secret_key_hex {
            keyring = keyring.with_default_key(SecretKey::from_hex(hex)?);
        }
        for (owner, hex) in &self.owner_keys {
            if owner.is_empty() {
                return Err(CryptoError::InvalidConfig(
                    "owner key entry without owner name".to_string(),
                ));
            }
            keyring = keyring.with_owner_key(owner.clone(), SecretKey::from_hex(hex)?);
        }

        Ok(keyring)
    }
}

impl std::fmt::Debug for KeyringConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let owners: Vec<&str> = self.owner_keys.iter().map(|(owner, _)| owner.as_str()).collect();
        f.debug_struct("KeyringConfig")
            .field("secret_key_hex", &self.secret_key_hex.as_ref().map(|_| ".."))
            .field("owners", &owners)
            .finish()
    }
}

fn parse_owner_keys(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((owner, key)) => (owner.trim().to_string(), key.trim().to_string()),
            None => (String::new(), entry.to_string()),
        })
        .collect()
}

/// Master keys by owner.
#[derive(Debug, Clone, Default)]
pub struct Keyring {
    default_key: Option<SecretKey>,
    owners: HashMap<String, SecretKey>,
}

impl Keyring {
    /// Create an empty keyring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key for messages that carry no owner.
    pub fn with_default_key(mut self, key: SecretKey) -> Self {
        self.default_key = Some(key);
        self
    }

    /// Add or replace the key for one owner.
    pub fn with_owner_key(mut self, owner: impl Into<String>, key: SecretKey) -> Self {
        self.owners.insert(owner.into(), key);
        self
    }

    /// Resolve the master key for a message.
    ///
    /// Owners never fall back to the default key.
    ///
    /// # Errors
    ///
    /// `CryptoError::UnknownOwner` for an unregistered owner,
    /// `CryptoError::NoDefaultKey` when no owner is given and no default is set.
    pub fn key_for(&self, owner: Option<&str>) -> Result<&SecretKey, CryptoError> {
        match owner {
            Some(owner) => self
                .owners
                .get(owner)
                .ok_or_else(|| CryptoError::UnknownOwner(owner.to_string())),
            None => self.default_key.as_ref().ok_or(CryptoError::NoDefaultKey),
        }
    }

    /// Number of owner-specific keys.
    pub fn owner_count(&self) -> usize {
        self.owners.len()
    }
}
