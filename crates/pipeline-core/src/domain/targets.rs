//! Consumer-side routing of decoded payloads

use crate::domain::payload::{DecodedPayload, VersionedPayload};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A downstream record built from a payload's attributes.
///
/// `save` owns persistence, including create-vs-update decisions.
pub trait TargetRecord: DeserializeOwned + Send + 'static {
    fn save(&mut self) -> anyhow::Result<()>;
}

type BuildFn = dyn Fn(&DecodedPayload) -> anyhow::Result<Box<dyn Any + Send>> + Send + Sync;
type ActionFn = dyn Fn(&DecodedPayload) -> anyhow::Result<()> + Send + Sync;

/// What to do with a decoded payload.
#[derive(Clone)]
pub enum Target {
    /// Build a record from the payload's attributes and save it.
    Construct {
        record_type: &'static str,
        build: Arc<BuildFn>,
    },
    /// Invoke a callback with the decoded payload.
    Action(Arc<ActionFn>),
}

impl Target {
    /// Construct and save a `T` for every matching payload.
    pub fn record<T: TargetRecord>() -> Self {
        Target::Construct {
            record_type: std::any::type_name::<T>(),
            build: Arc::new(|decoded: &DecodedPayload| {
                let attributes = decoded.payload().attributes()?;
                let mut record: T = serde_json::from_value(attributes)?;
                record.save()?;
                Ok(Box::new(record) as Box<dyn Any + Send>)
            }),
        }
    }

    /// Invoke `action` with the decoded payload.
    pub fn action<F>(action: F) -> Self
    where
        F: Fn(&DecodedPayload) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Target::Action(Arc::new(action))
    }

    /// Invoke `action` with the payload downcast to `P`.
    pub fn typed_action<P, F>(action: F) -> Self
    where
        P: VersionedPayload,
        F: Fn(&P) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Target::action(move |decoded: &DecodedPayload| {
            let payload = decoded.downcast_ref::<P>().ok_or_else(|| {
                anyhow::anyhow!("expected {}, got {}", P::TYPE_NAME, decoded.type_name())
            })?;
            action(payload)
        })
    }

    pub fn is_action(&self) -> bool {
        matches!(self, Target::Action(_))
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Construct { record_type, .. } => {
                f.debug_tuple("Construct").field(record_type).finish()
            }
            Target::Action(_) => f.write_str("Action"),
        }
    }
}

/// Result of routing one payload.
pub enum HandleOutcome {
    /// No target registered for the payload type.
    Ignored,
    Constructed {
        record_type: &'static str,
        record: Box<dyn Any + Send>,
    },
    ActionInvoked,
}

impl HandleOutcome {
    /// The constructed record, if it is a `T`.
    pub fn record<T: 'static>(&self) -> Option<&T> {
        match self {
            HandleOutcome::Constructed { record, .. } => record.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl fmt::Debug for HandleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleOutcome::Ignored => f.write_str("Ignored"),
            HandleOutcome::Constructed { record_type, .. } => f
                .debug_struct("Constructed")
                .field("record_type", record_type)
                .finish_non_exhaustive(),
            HandleOutcome::ActionInvoked => f.write_str("ActionInvoked"),
        }
    }
}

/// Payload type name to target. Registration is last-writer-wins.
#[derive(Default)]
pub struct TargetRegistry {
    targets: RwLock<HashMap<String, Target>>,
}

impl TargetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route payloads of type `P` to `target`, replacing any prior entry.
    pub fn register<P: VersionedPayload>(&self, target: Target) -> &Self {
        self.register_name(P::TYPE_NAME, Some(target))
    }

    /// Mark `P` as decode-only.
    pub fn deregister<P: VersionedPayload>(&self) -> &Self {
        self.register_name(P::TYPE_NAME, None)
    }

    /// Register by wire type name. `None` removes the entry.
    pub fn register_name(&self, type_name: &str, target: Option<Target>) -> &Self {
        let mut targets = self.targets.write();
        match target {
            Some(target) => {
                targets.insert(type_name.to_string(), target);
            }
            None => {
                targets.remove(type_name);
            }
        }
        self
    }

    pub fn resolve(&self, type_name: &str) -> Option<Target> {
        self.targets.read().get(type_name).cloned()
    }

    pub fn len(&self) -> usize {
        self.targets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.read().is_empty()
    }

    pub fn clear(&self) {
        self.targets.write().clear();
    }
}
