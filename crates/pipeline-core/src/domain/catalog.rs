//! Mapping from wire type names to payload decoders

use crate::domain::payload::{AnyPayload, VersionedPayload};
use crate::error::CodecError;
use parking_lot::RwLock;
use shared_types::{PipelineVersion, VersionError};
use std::collections::HashMap;

/// Decoder for one registered payload type.
pub type DecodeFn = fn(&[u8]) -> Result<Box<dyn AnyPayload>, CodecError>;

/// A registered payload type.
#[derive(Clone, Copy)]
pub struct CatalogEntry {
    version: PipelineVersion,
    decode: DecodeFn,
}

impl CatalogEntry {
    pub fn version(&self) -> PipelineVersion {
        self.version
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<Box<dyn AnyPayload>, CodecError> {
        (self.decode)(bytes)
    }
}

impl std::fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogEntry")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

fn decode_erased<P: VersionedPayload>(bytes: &[u8]) -> Result<Box<dyn AnyPayload>, CodecError> {
    Ok(Box::new(P::decode(bytes)?))
}

/// Payload types a subscriber can decode, keyed by `TYPE_NAME`.
#[derive(Default)]
pub struct PayloadCatalog {
    entries: RwLock<HashMap<&'static str, CatalogEntry>>,
}

impl PayloadCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `P` resolvable by its `TYPE_NAME`.
    ///
    /// Fails if the name carries no `_major_minor` marker.
    pub fn register<P: VersionedPayload>(&self) -> Result<&Self, VersionError> {
        let entry = CatalogEntry {
            version: P::version()?,
            decode: decode_erased::<P>,
        };
        self.entries.write().insert(P::TYPE_NAME, entry);
        Ok(self)
    }

    pub fn resolve(&self, type_name: &str) -> Option<CatalogEntry> {
        self.entries.read().get(type_name).copied()
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.entries.read().contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
