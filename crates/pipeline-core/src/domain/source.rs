//! Source objects and their declared payload versions
//!
//! A source type lists every version it can produce once, in
//! `PipelineSource::declare`. The declaration is compiled into a
//! `SourceSchema` the first time the source is emitted.

use crate::domain::payload::{AnyPayload, VersionedPayload};
use shared_types::{PipelineVersion, VersionError};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// Signature of an erased producer function.
pub type ProduceFn<S> = dyn Fn(&S) -> anyhow::Result<Box<dyn AnyPayload>> + Send + Sync;

/// A type whose instances are emitted through the pipeline.
///
/// ```ignore
/// impl PipelineSource for Widget {
///     const SOURCE_NAME: &'static str = "Widget";
///
///     fn declare(schema: &mut SchemaBuilder<Self>) {
///         schema
///             .default_producer(|w: &Widget| Ok(WidgetV1_0 { foo: w.foo.clone() }))
///             .version("1_1", |w: &Widget| Ok(WidgetV1_1 { foo: w.foo.clone(), extra: "hi".into() }));
///     }
/// }
/// ```
pub trait PipelineSource: Send + Sync + 'static {
    /// Type name used to derive channel names (`Widget` -> `widgets`).
    const SOURCE_NAME: &'static str;

    /// Register every producible version.
    fn declare(schema: &mut SchemaBuilder<Self>)
    where
        Self: Sized;

    /// Owner whose key encrypts this object's envelopes.
    fn owner_info(&self) -> Option<String> {
        None
    }
}

/// Producer for one version of a source.
pub struct Producer<S> {
    type_name: &'static str,
    produce: Arc<ProduceFn<S>>,
}

impl<S> Clone for Producer<S> {
    fn clone(&self) -> Self {
        Self {
            type_name: self.type_name,
            produce: Arc::clone(&self.produce),
        }
    }
}

impl<S> Producer<S> {
    /// `TYPE_NAME` of the payload this producer builds.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Build the payload. Must not mutate the source.
    pub fn produce(&self, source: &S) -> anyhow::Result<Box<dyn AnyPayload>> {
        (self.produce)(source)
    }
}

impl<S> std::fmt::Debug for Producer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Producer")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Collects version declarations for one source type.
pub struct SchemaBuilder<S> {
    explicit: BTreeMap<PipelineVersion, Producer<S>>,
    default: Option<Producer<S>>,
    errors: Vec<VersionError>,
}

impl<S: PipelineSource> SchemaBuilder<S> {
    pub(crate) fn new() -> Self {
        Self {
            explicit: BTreeMap::new(),
            default: None,
            errors: Vec::new(),
        }
    }

    /// Register the unsuffixed producer, treated as version `1_0` unless
    /// `version("1_0", ..)` is also declared.
    pub fn default_producer<P, F>(&mut self, produce: F) -> &mut Self
    where
        P: VersionedPayload,
        F: Fn(&S) -> anyhow::Result<P> + Send + Sync + 'static,
    {
        self.default = Some(erase(produce));
        self
    }

    /// Register the producer for `token` (`"N"` or `"N_M"`).
    ///
    /// An invalid token is reported when the schema is first used.
    pub fn version<P, F>(&mut self, token: &str, produce: F) -> &mut Self
    where
        P: VersionedPayload,
        F: Fn(&S) -> anyhow::Result<P> + Send + Sync + 'static,
    {
        match PipelineVersion::parse(token) {
            Ok(version) => {
                if let Ok(named) = P::version() {
                    if named != version {
                        warn!(
                            source = S::SOURCE_NAME,
                            declared = %version,
                            type_name = P::TYPE_NAME,
                            "Producer version differs from payload type name"
                        );
                    }
                }
                self.explicit.insert(version, erase(produce));
            }
            Err(e) => self.errors.push(e),
        }
        self
    }

    pub(crate) fn build(self) -> Result<SourceSchema<S>, VersionError> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(err);
        }

        let mut producers = self.explicit;
        if let Some(default) = self.default {
            producers.entry(PipelineVersion::DEFAULT).or_insert(default);
        }

        Ok(SourceSchema { producers })
    }
}

fn erase<S, P, F>(produce: F) -> Producer<S>
where
    P: VersionedPayload,
    F: Fn(&S) -> anyhow::Result<P> + Send + Sync + 'static,
{
    Producer {
        type_name: P::TYPE_NAME,
        produce: Arc::new(move |source: &S| {
            produce(source).map(|payload| Box::new(payload) as Box<dyn AnyPayload>)
        }),
    }
}

/// Compiled version table of one source type, in ascending version order.
pub struct SourceSchema<S> {
    producers: BTreeMap<PipelineVersion, Producer<S>>,
}

impl<S> SourceSchema<S> {
    pub fn versions(&self) -> impl Iterator<Item = PipelineVersion> + '_ {
        self.producers.keys().copied()
    }

    pub fn producer(&self, version: PipelineVersion) -> Option<&Producer<S>> {
        self.producers.get(&version)
    }

    pub fn len(&self) -> usize {
        self.producers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.producers.is_empty()
    }
}
