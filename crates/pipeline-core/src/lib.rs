//! # Pipeline Core
//!
//! Versioned, encrypted publishing of source objects and the matching
//! consumer-side decode and routing.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure logic, no I/O
//!   - `PipelineSource` / `SchemaBuilder`: explicit version declarations
//!   - `SchemaRegistry`: lazily compiled version tables per source type
//!   - `PayloadCatalog`: wire type name to decoder
//!   - `TargetRegistry`: payload type to construct/action target
//!   - `ChannelNaming`: `<namespace>-<stage>-v<major>-<table>`
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `EmitterApi`, `SubscriberApi`: driving ports
//!   - `CryptoProvider`, `Publisher`, `TargetRecord`: driven ports
//!
//! - **Service Layer** (`service/`): Orchestration
//!   - `Emitter`: implements `EmitterApi`
//!   - `Subscriber`: implements `SubscriberApi`
//!
//! - **Adapters Layer** (`adapters/`): External connections
//!   - `SubscriberBusAdapter`: feeds bus messages to a subscriber
//!
//! ## Invariants
//!
//! - Emit attempts every declared version in ascending order; one failing
//!   version never prevents the others from publishing.
//! - Only the major version selects the channel.
//! - An envelope that fails validation never reaches a target.
//!
//! ## Usage Example
//!
//! ```ignore
//! use pipeline_core::{ChannelNaming, Emitter, EmitterApi, SchemaRegistry};
//! use shared_bus::InMemoryChannelBus;
//! use std::sync::Arc;
//!
//! let emitter = Emitter::new(
//!     Arc::new(SchemaRegistry::new()),
//!     Arc::new(crypto),
//!     Arc::new(InMemoryChannelBus::new()),
//!     ChannelNaming::new("harrys", "production"),
//! );
//! let report = emitter.emit_created(&widget).await?;
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-export main types
pub use adapters::{AdapterReport, SubscriberBusAdapter};
pub use config::PipelineConfig;
pub use domain::{
    tableize, AnyPayload, CatalogEntry, ChannelNaming, DecodedPayload, HandleOutcome,
    PayloadCatalog, PipelineSource, Producer, SchemaBuilder, SchemaRegistry, SourceSchema, Target,
    TargetRecord, TargetRegistry, VersionedPayload,
};
pub use error::{CodecError, FailureStage, PipelineError, VersionFailure};
pub use metrics::{Metrics, MetricsRecorder, MetricsSnapshot, NoOpMetrics, RouteKind};
pub use ports::{EmitReport, EmitterApi, PublishedEnvelope, SubscriberApi};
pub use service::{Emitter, Subscriber};

pub use shared_types::{EncryptedEnvelope, EventKind, PipelineVersion};
