//! # Shared Types Crate
//!
//! Value types shared by every producer and consumer of the pipeline.
//!
//! ## Design Principles
//!
//! - **Envelope Integrity**: `EncryptedEnvelope` is the only structure that
//!   crosses the transport boundary. Transport and storage never see plaintext.
//! - **Self-Describing Messages**: every envelope names the schema of the
//!   payload it carries (`type_info`), so consumers never guess.
//! - **Independent Versions**: a `PipelineVersion` is a `(major, minor)` pair.
//!   Channels are partitioned by major only; caches key on the full pair.

pub mod envelope;
pub mod errors;
pub mod version;

pub use envelope::{EncryptedEnvelope, EventKind};
pub use errors::{EnvelopeError, VersionError};
pub use version::PipelineVersion;
