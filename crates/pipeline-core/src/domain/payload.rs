//! Versioned payload contract
//!
//! A payload is an immutable record produced from a source object for one
//! version. Its `TYPE_NAME` is what envelopes carry in `type_info`.

use crate::error::CodecError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{EventKind, PipelineVersion, VersionError};
use std::any::Any;
use std::fmt;

/// A concrete, versioned wire schema.
///
/// `TYPE_NAME` is fully qualified and its last segment must end in
/// `_<major>_<minor>`, e.g. `"inventory.Widget_1_1"`.
pub trait VersionedPayload: Serialize + DeserializeOwned + fmt::Debug + Send + Sync + 'static {
    const TYPE_NAME: &'static str;

    /// Version encoded in `TYPE_NAME`.
    fn version() -> Result<PipelineVersion, VersionError> {
        PipelineVersion::from_type_name(Self::TYPE_NAME)
    }

    /// Serialize for encryption. Defaults to bincode.
    fn encode(&self) -> Result<Vec<u8>, CodecError> {
        Ok(bincode::serialize(self)?)
    }

    /// Inverse of `encode`.
    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

/// Object-safe view of any `VersionedPayload`.
pub trait AnyPayload: Any + Send + Sync + fmt::Debug {
    /// The schema's `TYPE_NAME`.
    fn type_name(&self) -> &'static str;

    /// Version encoded in the schema's type name.
    fn payload_version(&self) -> Result<PipelineVersion, VersionError>;

    /// Serialize with the schema's own encoding.
    fn encode_payload(&self) -> Result<Vec<u8>, CodecError>;

    /// Attributes by field name, used to build target records.
    fn attributes(&self) -> Result<serde_json::Value, serde_json::Error>;

    fn as_any(&self) -> &dyn Any;
}

impl<P: VersionedPayload> AnyPayload for P {
    fn type_name(&self) -> &'static str {
        P::TYPE_NAME
    }

    fn payload_version(&self) -> Result<PipelineVersion, VersionError> {
        <P as VersionedPayload>::version()
    }

    fn encode_payload(&self) -> Result<Vec<u8>, CodecError> {
        self.encode()
    }

    fn attributes(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A payload recovered from an envelope.
#[derive(Debug)]
pub struct DecodedPayload {
    version: PipelineVersion,
    event_kind: Option<EventKind>,
    payload: Box<dyn AnyPayload>,
}

impl DecodedPayload {
    pub fn new(
        version: PipelineVersion,
        event_kind: Option<EventKind>,
        payload: Box<dyn AnyPayload>,
    ) -> Self {
        Self {
            version,
            event_kind,
            payload,
        }
    }

    /// Schema name of the decoded payload.
    pub fn type_name(&self) -> &'static str {
        self.payload.type_name()
    }

    pub fn version(&self) -> PipelineVersion {
        self.version
    }

    /// Lifecycle reason copied from the envelope.
    pub fn event_kind(&self) -> Option<EventKind> {
        self.event_kind
    }

    pub fn payload(&self) -> &dyn AnyPayload {
        self.payload.as_ref()
    }

    /// Borrow the payload as its concrete schema type.
    pub fn downcast_ref<P: VersionedPayload>(&self) -> Option<&P> {
        self.payload.as_any().downcast_ref::<P>()
    }
}
