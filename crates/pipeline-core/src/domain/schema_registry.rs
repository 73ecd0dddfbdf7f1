//! Lazily populated version tables, one per source type

use crate::domain::source::{PipelineSource, Producer, SchemaBuilder, SourceSchema};
use crate::error::PipelineError;
use parking_lot::RwLock;
use shared_types::PipelineVersion;
use std::any::{Any, TypeId};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Process-wide cache of compiled source schemas.
///
/// A schema is built on first request. Two callers racing on the same
/// source may both build it; the first insert wins and both observe the
/// same table. Build failures are not cached.
#[derive(Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
    discoveries: AtomicU64,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiled schema for `S`, building it on first use.
    pub fn schema_for<S: PipelineSource>(&self) -> Result<Arc<SourceSchema<S>>, PipelineError> {
        let key = TypeId::of::<S>();

        if let Some(cached) = self.schemas.read().get(&key) {
            if let Ok(schema) = Arc::clone(cached).downcast::<SourceSchema<S>>() {
                return Ok(schema);
            }
        }

        let mut builder = SchemaBuilder::<S>::new();
        S::declare(&mut builder);
        let built: Arc<dyn Any + Send + Sync> = Arc::new(builder.build()?);
        self.discoveries.fetch_add(1, Ordering::Relaxed);

        let stored = Arc::clone(self.schemas.write().entry(key).or_insert(built));
        let schema = stored
            .downcast::<SourceSchema<S>>()
            .map_err(|_| PipelineError::NoPipelineVersionsDeclared {
                source_type: S::SOURCE_NAME.to_string(),
            })?;

        debug!(
            source = S::SOURCE_NAME,
            versions = schema.len(),
            "Discovered pipeline versions"
        );
        Ok(schema)
    }

    /// Every declared version of `S`, ascending.
    pub fn versions_for<S: PipelineSource>(&self) -> Result<BTreeSet<PipelineVersion>, PipelineError> {
        Ok(self.schema_for::<S>()?.versions().collect())
    }

    /// Producer registered for `version` of `S`.
    pub fn producer_for<S: PipelineSource>(
        &self,
        version: PipelineVersion,
    ) -> Result<Producer<S>, PipelineError> {
        self.schema_for::<S>()?
            .producer(version)
            .cloned()
            .ok_or_else(|| PipelineError::UnknownVersion {
                source_type: S::SOURCE_NAME.to_string(),
                version,
            })
    }

    pub fn is_cached<S: PipelineSource>(&self) -> bool {
        self.schemas.read().contains_key(&TypeId::of::<S>())
    }

    /// Number of schema builds performed, including ones that lost a race.
    pub fn discoveries(&self) -> u64 {
        self.discoveries.load(Ordering::Relaxed)
    }

    /// Drop every cached schema.
    pub fn reset(&self) {
        self.schemas.write().clear();
    }
}
