//! Emitter Service
//!
//! Turns one source object into one encrypted envelope per declared version
//! and hands each to the publisher.

use async_trait::async_trait;
use shared_types::{EncryptedEnvelope, EventKind, PipelineVersion};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::domain::{ChannelNaming, PipelineSource, Producer, SchemaRegistry};
use crate::error::{FailureStage, PipelineError, VersionFailure};
use crate::metrics::{MetricsRecorder, NoOpMetrics};
use crate::ports::{
    CryptoProvider, EmitReport, EmitterApi, EncryptionContext, PublishedEnvelope, Publisher,
};

/// Emitter implementation
///
/// Implements the `EmitterApi` port using injected dependencies.
pub struct Emitter<C: CryptoProvider, P: Publisher> {
    /// Version tables, shared with other emitters in the process
    schemas: Arc<SchemaRegistry>,
    /// Encryption backend (driven port)
    crypto: Arc<C>,
    /// Transport (driven port)
    publisher: Arc<P>,
    naming: ChannelNaming,
    metrics: Arc<dyn MetricsRecorder>,
}

impl<C: CryptoProvider + 'static, P: Publisher + 'static> Emitter<C, P> {
    pub fn new(
        schemas: Arc<SchemaRegistry>,
        crypto: Arc<C>,
        publisher: Arc<P>,
        naming: ChannelNaming,
    ) -> Self {
        Self {
            schemas,
            crypto,
            publisher,
            naming,
            metrics: Arc::new(NoOpMetrics),
        }
    }

    /// Replace the metrics recorder.
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn naming(&self) -> &ChannelNaming {
        &self.naming
    }

    pub fn schemas(&self) -> &Arc<SchemaRegistry> {
        &self.schemas
    }

    /// Channel that envelopes of `version` of `S` are published to.
    pub fn channel_for<S: PipelineSource>(&self, version: PipelineVersion) -> String {
        self.naming.channel_for::<S>(version)
    }

    /// Build the envelope for one version without publishing it.
    ///
    /// # Errors
    ///
    /// `UnknownVersion` if `S` never declared `version`; any produce, encode
    /// or encrypt failure is reported as a single-entry
    /// `PartialPublishFailure`.
    pub fn create_envelope<S: PipelineSource>(
        &self,
        source: &S,
        version: PipelineVersion,
        event_kind: Option<EventKind>,
    ) -> Result<EncryptedEnvelope, PipelineError> {
        let producer = self.schemas.producer_for::<S>(version)?;
        self.seal(source, &producer, event_kind)
            .map_err(|(stage, reason)| PipelineError::PartialPublishFailure {
                source_type: S::SOURCE_NAME.to_string(),
                published: Vec::new(),
                failures: vec![VersionFailure {
                    version,
                    channel: self.channel_for::<S>(version),
                    stage,
                    reason,
                }],
            })
    }

    pub async fn emit_created<S: PipelineSource>(&self, source: &S) -> Result<EmitReport, PipelineError> {
        self.emit(source, Some(EventKind::Created)).await
    }

    pub async fn emit_updated<S: PipelineSource>(&self, source: &S) -> Result<EmitReport, PipelineError> {
        self.emit(source, Some(EventKind::Updated)).await
    }

    pub async fn emit_deleted<S: PipelineSource>(&self, source: &S) -> Result<EmitReport, PipelineError> {
        self.emit(source, Some(EventKind::Deleted)).await
    }

    /// produce -> encode -> encrypt -> wrap
    fn seal<S: PipelineSource>(
        &self,
        source: &S,
        producer: &Producer<S>,
        event_kind: Option<EventKind>,
    ) -> Result<EncryptedEnvelope, (FailureStage, String)> {
        let payload = producer
            .produce(source)
            .map_err(|e| (FailureStage::Produce, format!("{e:#}")))?;

        let plaintext = payload
            .encode_payload()
            .map_err(|e| (FailureStage::Encode, e.to_string()))?;

        let context = EncryptionContext {
            owner_info: source.owner_info(),
        };
        let sealed = self
            .crypto
            .encrypt(&plaintext, &context)
            .map_err(|e| (FailureStage::Encrypt, e.to_string()))?;

        Ok(EncryptedEnvelope {
            salt: sealed.salt,
            iv: sealed.iv,
            ciphertext: sealed.ciphertext,
            owner_info: sealed.owner_info,
            type_info: Some(payload.type_name().to_string()),
            event_kind,
            unknown_event_kind: None,
        })
    }
}

#[async_trait]
impl<C, P> EmitterApi for Emitter<C, P>
where
    C: CryptoProvider + 'static,
    P: Publisher + 'static,
{
    #[instrument(skip(self, source), fields(source_type = S::SOURCE_NAME))]
    async fn emit<S: PipelineSource>(
        &self,
        source: &S,
        event_kind: Option<EventKind>,
    ) -> Result<EmitReport, PipelineError> {
        let schema = self.schemas.schema_for::<S>()?;
        if schema.is_empty() {
            return Err(PipelineError::NoPipelineVersionsDeclared {
                source_type: S::SOURCE_NAME.to_string(),
            });
        }

        let mut published = Vec::with_capacity(schema.len());
        let mut failures = Vec::new();

        for version in schema.versions() {
            let channel = self.channel_for::<S>(version);
            let Some(producer) = schema.producer(version) else {
                continue;
            };

            let outcome = match self.seal(source, producer, event_kind) {
                Ok(envelope) => self
                    .publisher
                    .publish(&channel, envelope.encode_to_vec())
                    .await
                    .map_err(|e| (FailureStage::Publish, e.to_string())),
                Err(failure) => Err(failure),
            };

            match outcome {
                Ok(receivers) => {
                    debug!(%version, %channel, receivers, "Published envelope");
                    self.metrics.record_envelope_published(&channel);
                    published.push(PublishedEnvelope {
                        version,
                        channel,
                        receivers,
                    });
                }
                Err((stage, reason)) => {
                    warn!(%version, %channel, %stage, %reason, "Failed to emit version");
                    self.metrics.record_version_failed(stage);
                    failures.push(VersionFailure {
                        version,
                        channel,
                        stage,
                        reason,
                    });
                }
            }
        }

        if failures.is_empty() {
            Ok(EmitReport {
                source_type: S::SOURCE_NAME,
                published,
            })
        } else {
            info!(
                published = published.len(),
                failed = failures.len(),
                "Emit finished with failures"
            );
            Err(PipelineError::PartialPublishFailure {
                source_type: S::SOURCE_NAME.to_string(),
                published: published.into_iter().map(|p| p.version).collect(),
                failures,
            })
        }
    }
}
