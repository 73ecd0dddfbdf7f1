//! Metrics hooks for emit and subscribe operations
//!
//! `Metrics` keeps in-process counters. Hosts that export to Prometheus or
//! another backend implement `MetricsRecorder` and hand it to the
//! `Emitter`/`Subscriber`.

use crate::error::FailureStage;
use std::sync::atomic::{AtomicU64, Ordering};

/// How a successfully handled envelope was routed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    /// No target registered; payload decoded only
    Ignored,
    /// A target record was built and saved
    Constructed,
    /// A target action was invoked
    Action,
}

impl RouteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ignored => "ignored",
            Self::Constructed => "constructed",
            Self::Action => "action",
        }
    }
}

/// Thread-safe pipeline counters
#[derive(Default)]
pub struct Metrics {
    /// Envelopes delivered to the publisher
    pub envelopes_published: AtomicU64,
    /// Versions that failed during emit
    pub versions_failed: AtomicU64,
    /// Envelopes handled successfully
    pub envelopes_handled: AtomicU64,
    /// Envelopes rejected with an error
    pub envelopes_rejected: AtomicU64,
    /// Target records constructed
    pub targets_constructed: AtomicU64,
    /// Target actions invoked
    pub actions_invoked: AtomicU64,
    /// Payloads with no registered target
    pub payloads_ignored: AtomicU64,
    /// Envelopes lost because the subscriber fell behind the transport
    pub envelopes_lagged: AtomicU64,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            envelopes_published: self.envelopes_published.load(Ordering::Relaxed),
            versions_failed: self.versions_failed.load(Ordering::Relaxed),
            envelopes_handled: self.envelopes_handled.load(Ordering::Relaxed),
            envelopes_rejected: self.envelopes_rejected.load(Ordering::Relaxed),
            targets_constructed: self.targets_constructed.load(Ordering::Relaxed),
            actions_invoked: self.actions_invoked.load(Ordering::Relaxed),
            payloads_ignored: self.payloads_ignored.load(Ordering::Relaxed),
            envelopes_lagged: self.envelopes_lagged.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.envelopes_published.store(0, Ordering::Relaxed);
        self.versions_failed.store(0, Ordering::Relaxed);
        self.envelopes_handled.store(0, Ordering::Relaxed);
        self.envelopes_rejected.store(0, Ordering::Relaxed);
        self.targets_constructed.store(0, Ordering::Relaxed);
        self.actions_invoked.store(0, Ordering::Relaxed);
        self.payloads_ignored.store(0, Ordering::Relaxed);
        self.envelopes_lagged.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub envelopes_published: u64,
    pub versions_failed: u64,
    pub envelopes_handled: u64,
    pub envelopes_rejected: u64,
    pub targets_constructed: u64,
    pub actions_invoked: u64,
    pub payloads_ignored: u64,
    pub envelopes_lagged: u64,
}

/// Trait for custom metrics recording implementations
pub trait MetricsRecorder: Send + Sync {
    /// An envelope was accepted by the publisher
    fn record_envelope_published(&self, channel: &str);

    /// One version of an emit failed
    fn record_version_failed(&self, stage: FailureStage);

    /// An incoming envelope was handled
    fn record_envelope_handled(&self, route: RouteKind);

    /// An incoming envelope was rejected; `kind` is `PipelineError::kind()`
    fn record_envelope_rejected(&self, kind: &'static str);

    /// `count` envelopes were dropped by the transport before delivery
    fn record_envelopes_lagged(&self, count: u64);
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Default)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_envelope_published(&self, _: &str) {}
    fn record_version_failed(&self, _: FailureStage) {}
    fn record_envelope_handled(&self, _: RouteKind) {}
    fn record_envelope_rejected(&self, _: &'static str) {}
    fn record_envelopes_lagged(&self, _: u64) {}
}

impl MetricsRecorder for Metrics {
    fn record_envelope_published(&self, _channel: &str) {
        self.envelopes_published.fetch_add(1, Ordering::Relaxed);
    }

    fn record_version_failed(&self, _stage: FailureStage) {
        self.versions_failed.fetch_add(1, Ordering::Relaxed);
    }

    fn record_envelope_handled(&self, route: RouteKind) {
        self.envelopes_handled.fetch_add(1, Ordering::Relaxed);
        let counter = match route {
            RouteKind::Ignored => &self.payloads_ignored,
            RouteKind::Constructed => &self.targets_constructed,
            RouteKind::Action => &self.actions_invoked,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn record_envelope_rejected(&self, _kind: &'static str) {
        self.envelopes_rejected.fetch_add(1, Ordering::Relaxed);
    }

    fn record_envelopes_lagged(&self, count: u64) {
        self.envelopes_lagged.fetch_add(count, Ordering::Relaxed);
    }
}
