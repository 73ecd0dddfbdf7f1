//! Error types for the envelope pipeline

use shared_crypto::CryptoError;
use shared_types::{PipelineVersion, VersionError};
use std::fmt;
use thiserror::Error;

/// Errors that can occur while emitting or handling envelopes
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid pipeline version format: {token:?}")]
    InvalidVersionFormat { token: String },

    #[error("No pipeline versions declared for {source_type}")]
    NoPipelineVersionsDeclared { source_type: String },

    #[error("Version {version} was never declared for {source_type}")]
    UnknownVersion {
        source_type: String,
        version: PipelineVersion,
    },

    #[error("Emit of {source_type} failed for {} version(s): {}", .failures.len(), FailureList(.failures))]
    PartialPublishFailure {
        source_type: String,
        /// Versions that were published successfully in the same call
        published: Vec<PipelineVersion>,
        failures: Vec<VersionFailure>,
    },

    #[error("Malformed envelope: {reason}")]
    MalformedEnvelope { reason: String },

    #[error("Decryption failed for {type_info}: {source}")]
    DecryptionFailure {
        type_info: String,
        #[source]
        source: CryptoError,
    },

    #[error("Unresolved payload type: {type_info}")]
    UnresolvedPayloadType { type_info: String },

    #[error("Failed to decode {type_info}: {source}")]
    DecodeFailure {
        type_info: String,
        #[source]
        source: CodecError,
    },

    #[error("Target {target} failed to persist {type_info}: {source}")]
    TargetPersistFailure {
        type_info: String,
        target: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("Target action for {type_info} failed: {source}")]
    TargetActionFailure {
        type_info: String,
        #[source]
        source: anyhow::Error,
    },
}

impl PipelineError {
    /// Stable snake_case name of the error kind, for logs and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidVersionFormat { .. } => "invalid_version_format",
            Self::NoPipelineVersionsDeclared { .. } => "no_pipeline_versions_declared",
            Self::UnknownVersion { .. } => "unknown_version",
            Self::PartialPublishFailure { .. } => "partial_publish_failure",
            Self::MalformedEnvelope { .. } => "malformed_envelope",
            Self::DecryptionFailure { .. } => "decryption_failure",
            Self::UnresolvedPayloadType { .. } => "unresolved_payload_type",
            Self::DecodeFailure { .. } => "decode_failure",
            Self::TargetPersistFailure { .. } => "target_persist_failure",
            Self::TargetActionFailure { .. } => "target_action_failure",
        }
    }
}

impl From<VersionError> for PipelineError {
    fn from(err: VersionError) -> Self {
        let token = match err {
            VersionError::InvalidFormat { token } => token,
            VersionError::MissingMarker { type_name } => type_name,
        };
        Self::InvalidVersionFormat { token }
    }
}

/// Step of the per-version emit sequence that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureStage {
    /// The producer function returned an error
    Produce,
    /// The payload could not be serialized
    Encode,
    /// The crypto provider refused to seal the payload
    Encrypt,
    /// The publisher did not deliver the envelope
    Publish,
}

impl FailureStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Produce => "produce",
            Self::Encode => "encode",
            Self::Encrypt => "encrypt",
            Self::Publish => "publish",
        }
    }
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One version that could not be emitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionFailure {
    pub version: PipelineVersion,
    pub channel: String,
    pub stage: FailureStage,
    pub reason: String,
}

impl fmt::Display for VersionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} to {}): {}", self.version, self.stage, self.channel, self.reason)
    }
}

struct FailureList<'a>(&'a [VersionFailure]);

impl fmt::Display for FailureList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

/// Payload serialization errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CodecError(pub String);

impl From<bincode::Error> for CodecError {
    fn from(err: bincode::Error) -> Self {
        Self(err.to_string())
    }
}
