//! Inbound Ports (Driving Ports)
//!
//! Lifecycle triggers call `EmitterApi`; transport delivery callbacks call
//! `SubscriberApi`.

use async_trait::async_trait;
use shared_types::{EncryptedEnvelope, EventKind, PipelineVersion};

use crate::domain::{HandleOutcome, PipelineSource};
use crate::error::PipelineError;

/// One envelope accepted by the publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedEnvelope {
    pub version: PipelineVersion,
    pub channel: String,
    /// Receivers reported by the publisher
    pub receivers: usize,
}

/// Outcome of a fully successful emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitReport {
    pub source_type: &'static str,
    /// In ascending version order
    pub published: Vec<PublishedEnvelope>,
}

impl EmitReport {
    pub fn versions(&self) -> Vec<PipelineVersion> {
        self.published.iter().map(|p| p.version).collect()
    }

    pub fn channels(&self) -> Vec<&str> {
        self.published.iter().map(|p| p.channel.as_str()).collect()
    }
}

/// Producer-side API (Driving Port)
#[async_trait]
pub trait EmitterApi: Send + Sync {
    /// Publish one envelope per declared version of `source`.
    ///
    /// Versions are attempted in ascending order; a failing version does not
    /// stop the rest. Any failure yields `PartialPublishFailure`.
    async fn emit<S: PipelineSource>(
        &self,
        source: &S,
        event_kind: Option<EventKind>,
    ) -> Result<EmitReport, PipelineError>;
}

/// Consumer-side API (Driving Port)
#[async_trait]
pub trait SubscriberApi: Send + Sync {
    /// Decode raw transport bytes into an envelope, then handle it.
    async fn handle_bytes(&self, bytes: &[u8]) -> Result<HandleOutcome, PipelineError>;

    /// Validate, decrypt, decode and route one envelope.
    async fn handle_envelope(
        &self,
        envelope: &EncryptedEnvelope,
    ) -> Result<HandleOutcome, PipelineError>;
}
