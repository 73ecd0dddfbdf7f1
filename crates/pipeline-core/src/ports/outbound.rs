//! Outbound Ports (Driven Ports)
//!
//! - `CryptoProvider` seals and opens payload bytes (owns salts and nonces)
//! - `Publisher` delivers encoded envelopes to a named channel
//! - `TargetRecord::save` persists constructed records

pub use crate::domain::TargetRecord;
pub use shared_bus::{PublishError, Publisher};
pub use shared_crypto::{CryptoError, CryptoProvider, EncryptionContext, SealedMessage};
