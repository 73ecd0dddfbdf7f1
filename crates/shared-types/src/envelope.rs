//! # `EncryptedEnvelope`
//!
//! The uniform wrapper for every payload that crosses the transport.
//!
//! ## Wire Format
//!
//! Protobuf-compatible binary encoding, fields in tag order:
//!
//! | tag | field | kind |
//! |-----|-------|------|
//! | 1 | `salt` | string, required |
//! | 2 | `iv` | string, required |
//! | 3 | `ciphertext` | string, required |
//! | 4 | `owner_info` | string, optional |
//! | 5 | `type_info` | string, optional |
//! | 6 | `event_kind` | enum, optional (`CREATED=0, UPDATED=1, DELETED=2`) |
//!
//! Unknown tags are skipped on decode so newer producers can add fields
//! without breaking older consumers. An `event_kind` number outside the
//! known kinds is kept in `unknown_event_kind` and written back unchanged.

use crate::errors::EnvelopeError;
use prost::Message;
use serde::{Deserialize, Serialize};

/// Lifecycle reason an envelope was produced.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, prost::Enumeration,
)]
#[repr(i32)]
pub enum EventKind {
    /// The source object was created.
    Created = 0,
    /// The source object was updated.
    Updated = 1,
    /// The source object was deleted.
    Deleted = 2,
}

impl EventKind {
    /// Wire name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Updated => "UPDATED",
            Self::Deleted => "DELETED",
        }
    }
}

/// On-the-wire layout. Kept private so the public type can use
/// `Option<EventKind>` instead of a raw enum number.
#[derive(Clone, PartialEq, Message)]
struct WireEnvelope {
    #[prost(string, tag = "1")]
    salt: String,
    #[prost(string, tag = "2")]
    iv: String,
    #[prost(string, tag = "3")]
    ciphertext: String,
    #[prost(string, optional, tag = "4")]
    owner_info: Option<String>,
    #[prost(string, optional, tag = "5")]
    type_info: Option<String>,
    #[prost(enumeration = "EventKind", optional, tag = "6")]
    event_kind: Option<i32>,
}

/// Encrypted, self-describing wrapper around one versioned payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncryptedEnvelope {
    /// Key-derivation material for this message.
    pub salt: String,
    /// Initialization vector for this message.
    pub iv: String,
    /// Encrypted serialized payload.
    pub ciphertext: String,
    /// Identifies which key/owner encrypted this message.
    pub owner_info: Option<String>,
    /// Fully qualified name of the payload schema type.
    pub type_info: Option<String>,
    /// Lifecycle reason, set by the trigger that caused the emit.
    pub event_kind: Option<EventKind>,
    /// Raw tag 6 value when it names no known `EventKind`. Ignored on encode
    /// while `event_kind` is set.
    pub unknown_event_kind: Option<i32>,
}

impl EncryptedEnvelope {
    /// Serialize to the wire format.
    #[must_use]
    pub fn encode_to_vec(&self) -> Vec<u8> {
        WireEnvelope {
            salt: self.salt.clone(),
            iv: self.iv.clone(),
            ciphertext: self.ciphertext.clone(),
            owner_info: self.owner_info.clone(),
            type_info: self.type_info.clone(),
            event_kind: self.event_kind.map(i32::from).or(self.unknown_event_kind),
        }
        .encode_to_vec()
    }

    /// Parse from the wire format.
    ///
    /// Unknown fields are ignored. An `event_kind` number this build does not
    /// know decodes as `None` and is kept in `unknown_event_kind`.
    ///
    /// # Errors
    ///
    /// Returns `EnvelopeError::Decode` if the bytes are not a valid encoding.
    pub fn decode(bytes: &[u8]) -> Result<Self, EnvelopeError> {
        let wire =
            WireEnvelope::decode(bytes).map_err(|e| EnvelopeError::Decode(e.to_string()))?;

        let (event_kind, unknown_event_kind) = match wire.event_kind {
            Some(raw) => match EventKind::try_from(raw) {
                Ok(kind) => (Some(kind), None),
                Err(_) => (None, Some(raw)),
            },
            None => (None, None),
        };

        Ok(Self {
            salt: wire.salt,
            iv: wire.iv,
            ciphertext: wire.ciphertext,
            owner_info: wire.owner_info,
            type_info: wire.type_info,
            event_kind,
            unknown_event_kind,
        })
    }

    /// Check that every field needed to decrypt and route is present.
    ///
    /// # Errors
    ///
    /// Returns `EnvelopeError::MissingField` naming the first empty field.
    pub fn validate(&self) -> Result<(), EnvelopeError> {
        if self.salt.is_empty() {
            return Err(EnvelopeError::MissingField("salt"));
        }
        if self.iv.is_empty() {
            return Err(EnvelopeError::MissingField("iv"));
        }
        if self.ciphertext.is_empty() {
            return Err(EnvelopeError::MissingField("ciphertext"));
        }
        match self.type_info.as_deref() {
            Some(name) if !name.is_empty() => Ok(()),
            _ => Err(EnvelopeError::MissingField("type_info")),
        }
    }

    /// The payload schema name, if present.
    #[must_use]
    pub fn type_info(&self) -> Option<&str> {
        self.type_info.as_deref()
    }
}
