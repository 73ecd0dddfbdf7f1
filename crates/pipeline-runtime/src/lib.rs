//! # Pipeline Runtime
//!
//! Hosts an emitter and a subscriber on one in-process channel bus.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (from env)
//! 2. Validate a secret key is present for production
//! 3. Build keyring, crypto provider and bus
//! 4. Register payload types and targets
//! 5. Spawn the subscriber bus adapter
//! 6. Signal ready

pub mod config;
pub mod orders;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use pipeline_core::{
    AdapterReport, ChannelNaming, EmitReport, Emitter, EmitterApi, MetricsRecorder,
    PayloadCatalog, SchemaRegistry, Subscriber, SubscriberBusAdapter, Target, TargetRegistry,
};
use pipeline_telemetry::PrometheusRecorder;
use shared_bus::{ChannelFilter, InMemoryChannelBus};
use shared_crypto::{Keyring, SecretKey, XChaChaProvider};
use shared_types::EventKind;

use crate::config::RuntimeConfig;
use crate::orders::{Order, OrderSummary, OrderV1_0, OrderV2_0};

/// The runtime wiring emitter, subscriber and bus together.
pub struct PipelineRuntime {
    config: RuntimeConfig,
    bus: Arc<InMemoryChannelBus>,
    emitter: Emitter<XChaChaProvider, InMemoryChannelBus>,
    subscriber: Arc<Subscriber<XChaChaProvider>>,
    consumer: Option<JoinHandle<AdapterReport>>,
}

impl PipelineRuntime {
    /// Build every component from configuration.
    ///
    /// # Errors
    ///
    /// Invalid keys, a missing production key, or a payload type without a
    /// version marker.
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        config.validate_for_production()?;

        let crypto = Arc::new(XChaChaProvider::new(build_keyring(&config)?));
        let bus = Arc::new(InMemoryChannelBus::new());
        let metrics: Arc<dyn MetricsRecorder> = Arc::new(PrometheusRecorder);

        let catalog = Arc::new(PayloadCatalog::new());
        catalog
            .register::<OrderV1_0>()
            .context("Failed to register Order 1_0")?
            .register::<OrderV2_0>()
            .context("Failed to register Order 2_0")?;

        let targets = Arc::new(TargetRegistry::new());
        targets.register::<OrderV2_0>(Target::record::<OrderSummary>());

        let subscriber = Arc::new(
            Subscriber::new(Arc::clone(&crypto), catalog, targets).with_metrics(Arc::clone(&metrics)),
        );

        let emitter = Emitter::new(
            Arc::new(SchemaRegistry::new()),
            crypto,
            Arc::clone(&bus),
            ChannelNaming::from_config(&config.pipeline),
        )
        .with_metrics(metrics);

        Ok(Self {
            config,
            bus,
            emitter,
            subscriber,
            consumer: None,
        })
    }

    /// Start consuming every channel in this namespace and stage.
    pub fn start(&mut self) -> Result<()> {
        info!("===========================================");
        info!("  Envelope Pipeline Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("  Namespace: {}", self.config.pipeline.namespace);
        info!("  Stage: {}", self.config.pipeline.stage);
        info!("===========================================");

        let prefix = format!(
            "{}-{}-",
            self.config.pipeline.namespace, self.config.pipeline.stage
        );
        let adapter = SubscriberBusAdapter::new(
            &self.bus,
            Arc::clone(&self.subscriber),
            ChannelFilter::prefix(prefix),
        )
        .context("Failed to subscribe to channel bus")?
        .with_metrics(Arc::new(PrometheusRecorder));

        self.consumer = Some(tokio::spawn(adapter.run()));
        info!("Subscriber bus adapter running");
        Ok(())
    }

    /// Emit an order lifecycle event.
    pub async fn publish_order(&self, order: &Order, event_kind: EventKind) -> Result<EmitReport> {
        let report = self
            .emitter
            .emit(order, Some(event_kind))
            .await
            .with_context(|| format!("Failed to emit order {}", order.id))?;

        info!(
            order_id = order.id,
            event_kind = event_kind.as_str(),
            channels = ?report.channels(),
            "Order emitted"
        );
        Ok(report)
    }

    pub fn emitter(&self) -> &Emitter<XChaChaProvider, InMemoryChannelBus> {
        &self.emitter
    }

    /// Close the bus and wait for the consumer to drain.
    pub async fn shutdown(mut self) -> Result<AdapterReport> {
        info!("Initiating graceful shutdown...");
        self.bus.close();

        let report = match self.consumer.take() {
            Some(handle) => handle.await.context("Subscriber task panicked")?,
            None => AdapterReport::default(),
        };

        info!(
            handled = report.handled,
            failed = report.failed,
            "Shutdown complete"
        );
        Ok(report)
    }
}

/// Keyring from configuration. Outside production a missing default key is
/// replaced by a random one that lives for this process only.
fn build_keyring(config: &RuntimeConfig) -> Result<Keyring> {
    let keyring = config
        .keyring
        .build()
        .context("Invalid keyring configuration")?;

    if config.keyring.secret_key_hex.is_some() {
        return Ok(keyring);
    }

    warn!("PIPELINE_SECRET_KEY not set, using an ephemeral key");
    Ok(keyring.with_default_key(SecretKey::generate()))
}
