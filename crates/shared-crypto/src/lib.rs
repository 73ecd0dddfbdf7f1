//! # Shared Crypto - Envelope Encryption
//!
//! ## Components
//!
//! | Module | Contents |
//! |--------|----------|
//! | `provider` | `CryptoProvider` contract, `EncryptionContext`, `SealedMessage` |
//! | `keyring` | Per-owner key lookup, loaded from the environment |
//! | `kdf` | Per-message key derivation from a master key and salt (BLAKE3) |
//! | `symmetric` | XChaCha20-Poly1305 primitives |
//! | `xchacha` | Default `CryptoProvider` built from the pieces above |
//!
//! ## Security Properties
//!
//! - Every message gets a fresh random salt and a fresh 192-bit nonce.
//! - The salt feeds key derivation, so no two messages share a data key.
//! - `owner_info` selects the master key, which keeps tenants isolated.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod kdf;
pub mod keyring;
pub mod provider;
pub mod symmetric;
pub mod xchacha;

// Re-exports
pub use errors::CryptoError;
pub use keyring::{Keyring, KeyringConfig};
pub use provider::{CryptoProvider, EncryptionContext, SealedMessage};
pub use symmetric::{decrypt, encrypt, Nonce, SecretKey};
pub use xchacha::XChaChaProvider;
