//! Subscriber Service
//!
//! One incoming envelope runs through:
//! validate -> decrypt -> resolve type -> decode -> route.
//! Every failure is terminal and returned to the caller.

use async_trait::async_trait;
use shared_types::EncryptedEnvelope;
use std::sync::Arc;
use tracing::{debug, error, instrument};

use crate::domain::{DecodedPayload, HandleOutcome, PayloadCatalog, Target, TargetRegistry};
use crate::error::PipelineError;
use crate::metrics::{MetricsRecorder, NoOpMetrics, RouteKind};
use crate::ports::{CryptoProvider, SubscriberApi};

/// Subscriber implementation
///
/// Implements the `SubscriberApi` port using injected dependencies.
pub struct Subscriber<C: CryptoProvider> {
    /// Decryption backend (driven port)
    crypto: Arc<C>,
    /// Known payload types
    catalog: Arc<PayloadCatalog>,
    /// Registered handling targets
    targets: Arc<TargetRegistry>,
    metrics: Arc<dyn MetricsRecorder>,
}

impl<C: CryptoProvider> Subscriber<C> {
    pub fn new(crypto: Arc<C>, catalog: Arc<PayloadCatalog>, targets: Arc<TargetRegistry>) -> Self {
        Self {
            crypto,
            catalog,
            targets,
            metrics: Arc::new(NoOpMetrics),
        }
    }

    /// Replace the metrics recorder.
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn catalog(&self) -> &Arc<PayloadCatalog> {
        &self.catalog
    }

    pub fn targets(&self) -> &Arc<TargetRegistry> {
        &self.targets
    }

    /// Target registered for a payload type name.
    pub fn target_for(&self, type_name: &str) -> Option<Target> {
        self.targets.resolve(type_name)
    }

    /// Validate, decrypt and decode without routing.
    ///
    /// # Errors
    ///
    /// `MalformedEnvelope`, `DecryptionFailure`, `UnresolvedPayloadType` or
    /// `DecodeFailure`, in that order of checking.
    pub fn decode_payload(&self, envelope: &EncryptedEnvelope) -> Result<DecodedPayload, PipelineError> {
        envelope
            .validate()
            .map_err(|e| PipelineError::MalformedEnvelope {
                reason: e.to_string(),
            })?;
        let type_info = envelope.type_info().unwrap_or_default();

        let plaintext = self
            .crypto
            .decrypt(
                &envelope.salt,
                &envelope.iv,
                &envelope.ciphertext,
                envelope.owner_info.as_deref(),
            )
            .map_err(|source| PipelineError::DecryptionFailure {
                type_info: type_info.to_string(),
                source,
            })?;

        let entry = self
            .catalog
            .resolve(type_info)
            .ok_or_else(|| PipelineError::UnresolvedPayloadType {
                type_info: type_info.to_string(),
            })?;

        let payload = entry
            .decode(&plaintext)
            .map_err(|source| PipelineError::DecodeFailure {
                type_info: type_info.to_string(),
                source,
            })?;

        Ok(DecodedPayload::new(entry.version(), envelope.event_kind, payload))
    }

    /// Route an already decoded payload to its target.
    ///
    /// No registered target is a successful no-op.
    pub fn handle_payload(&self, decoded: &DecodedPayload) -> Result<HandleOutcome, PipelineError> {
        let type_info = decoded.type_name();

        match self.target_for(type_info) {
            None => {
                debug!(type_info, "No target registered, ignoring payload");
                Ok(HandleOutcome::Ignored)
            }
            Some(Target::Construct { record_type, build }) => {
                let record = build(decoded).map_err(|source| PipelineError::TargetPersistFailure {
                    type_info: type_info.to_string(),
                    target: record_type,
                    source,
                })?;
                Ok(HandleOutcome::Constructed {
                    record_type,
                    record,
                })
            }
            Some(Target::Action(action)) => {
                action(decoded).map_err(|source| PipelineError::TargetActionFailure {
                    type_info: type_info.to_string(),
                    source,
                })?;
                Ok(HandleOutcome::ActionInvoked)
            }
        }
    }

    fn process(&self, envelope: &EncryptedEnvelope) -> Result<HandleOutcome, PipelineError> {
        let decoded = self.decode_payload(envelope)?;
        debug!(
            type_info = decoded.type_name(),
            version = %decoded.version(),
            event_kind = ?decoded.event_kind(),
            "Decoded envelope"
        );
        self.handle_payload(&decoded)
    }

    fn record(&self, envelope: Option<&EncryptedEnvelope>, result: &Result<HandleOutcome, PipelineError>) {
        match result {
            Ok(outcome) => {
                let route = match outcome {
                    HandleOutcome::Ignored => RouteKind::Ignored,
                    HandleOutcome::Constructed { .. } => RouteKind::Constructed,
                    HandleOutcome::ActionInvoked => RouteKind::Action,
                };
                self.metrics.record_envelope_handled(route);
            }
            Err(e) => {
                let type_info = envelope.and_then(EncryptedEnvelope::type_info);
                error!(type_info = ?type_info, kind = e.kind(), error = %e, "Envelope rejected");
                self.metrics.record_envelope_rejected(e.kind());
            }
        }
    }
}

#[async_trait]
impl<C: CryptoProvider + 'static> SubscriberApi for Subscriber<C> {
    async fn handle_bytes(&self, bytes: &[u8]) -> Result<HandleOutcome, PipelineError> {
        match EncryptedEnvelope::decode(bytes) {
            Ok(envelope) => self.handle_envelope(&envelope).await,
            Err(e) => {
                let result = Err(PipelineError::MalformedEnvelope {
                    reason: e.to_string(),
                });
                self.record(None, &result);
                result
            }
        }
    }

    #[instrument(skip_all, fields(type_info = envelope.type_info().unwrap_or("<none>")))]
    async fn handle_envelope(
        &self,
        envelope: &EncryptedEnvelope,
    ) -> Result<HandleOutcome, PipelineError> {
        let result = self.process(envelope);
        self.record(Some(envelope), &result);
        result
    }
}
