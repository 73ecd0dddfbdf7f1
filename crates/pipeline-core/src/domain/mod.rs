//! Domain Layer - Pure pipeline logic
//!
//! This layer contains:
//! - Versioned payload contract and decoded payload view
//! - Source declarations and the schema registry
//! - Payload catalog (type name to decoder)
//! - Target registry and routing outcomes
//! - Channel naming
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod catalog;
pub mod naming;
pub mod payload;
pub mod schema_registry;
pub mod source;
pub mod targets;

pub use catalog::{CatalogEntry, PayloadCatalog};
pub use naming::{tableize, ChannelNaming};
pub use payload::{AnyPayload, DecodedPayload, VersionedPayload};
pub use schema_registry::SchemaRegistry;
pub use source::{PipelineSource, Producer, SchemaBuilder, SourceSchema};
pub use targets::{HandleOutcome, Target, TargetRecord, TargetRegistry};
