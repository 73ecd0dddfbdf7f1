//! Ports Layer
//!
//! Defines the interfaces (traits) for:
//! - Driving Ports (inbound) - API for lifecycle triggers and transports
//! - Driven Ports (outbound) - Crypto, publishing and persistence

pub mod inbound;
pub mod outbound;

pub use inbound::{EmitReport, EmitterApi, PublishedEnvelope, SubscriberApi};
pub use outbound::{
    CryptoError, CryptoProvider, EncryptionContext, PublishError, Publisher, SealedMessage,
    TargetRecord,
};
