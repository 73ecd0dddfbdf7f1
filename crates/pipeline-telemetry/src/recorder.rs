//! `MetricsRecorder` backed by the Prometheus statics.

use pipeline_core::{FailureStage, MetricsRecorder, RouteKind};

use crate::metrics::{
    ENVELOPES_HANDLED, ENVELOPES_LAGGED, ENVELOPES_PUBLISHED, ENVELOPES_REJECTED, VERSIONS_FAILED,
};

/// Forwards pipeline events to the global Prometheus counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrometheusRecorder;

impl MetricsRecorder for PrometheusRecorder {
    fn record_envelope_published(&self, channel: &str) {
        ENVELOPES_PUBLISHED.with_label_values(&[channel]).inc();
    }

    fn record_version_failed(&self, stage: FailureStage) {
        VERSIONS_FAILED.with_label_values(&[stage.as_str()]).inc();
    }

    fn record_envelope_handled(&self, route: RouteKind) {
        ENVELOPES_HANDLED.with_label_values(&[route.as_str()]).inc();
    }

    fn record_envelope_rejected(&self, kind: &'static str) {
        ENVELOPES_REJECTED.with_label_values(&[kind]).inc();
    }

    fn record_envelopes_lagged(&self, count: u64) {
        ENVELOPES_LAGGED.inc_by(count);
    }
}
