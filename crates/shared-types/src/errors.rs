//! # Error Types
//!
//! Errors raised while parsing version markers and envelope bytes.

use thiserror::Error;

/// Errors that can occur while parsing a version marker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    /// Token is not `N` or `N_M` with decimal components.
    #[error("Invalid pipeline version format: {token:?}")]
    InvalidFormat { token: String },

    /// A payload type name does not end in `_<major>_<minor>`.
    #[error("Type name carries no version marker: {type_name:?}")]
    MissingMarker { type_name: String },
}

/// Errors related to envelope decoding and validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    /// The bytes are not a valid envelope encoding.
    #[error("Envelope decode failed: {0}")]
    Decode(String),

    /// A field needed for routing or decryption is absent or empty.
    #[error("Envelope missing required field: {0}")]
    MissingField(&'static str),
}
