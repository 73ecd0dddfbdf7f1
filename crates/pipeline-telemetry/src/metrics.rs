//! Prometheus metrics for the envelope pipeline.
//!
//! All metrics follow the naming convention: `pipeline_<area>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, IntCounter, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // EMIT METRICS
    // =========================================================================

    /// Envelopes accepted by the publisher
    pub static ref ENVELOPES_PUBLISHED: CounterVec = CounterVec::new(
        Opts::new("pipeline_emit_envelopes_published_total", "Envelopes accepted by the publisher"),
        &["channel"]
    ).expect("metric creation failed");

    /// Versions that failed during emit
    pub static ref VERSIONS_FAILED: CounterVec = CounterVec::new(
        Opts::new("pipeline_emit_versions_failed_total", "Versions that failed during emit"),
        &["stage"]  // stage: produce/encode/encrypt/publish
    ).expect("metric creation failed");

    // =========================================================================
    // SUBSCRIBE METRICS
    // =========================================================================

    /// Envelopes handled successfully
    pub static ref ENVELOPES_HANDLED: CounterVec = CounterVec::new(
        Opts::new("pipeline_subscribe_envelopes_handled_total", "Envelopes handled successfully"),
        &["route"]  // route: ignored/constructed/action
    ).expect("metric creation failed");

    /// Envelopes rejected with an error
    pub static ref ENVELOPES_REJECTED: CounterVec = CounterVec::new(
        Opts::new("pipeline_subscribe_envelopes_rejected_total", "Envelopes rejected by kind"),
        &["error_kind"]
    ).expect("metric creation failed");

    /// Envelopes the transport dropped before the subscriber read them
    pub static ref ENVELOPES_LAGGED: IntCounter = IntCounter::new(
        "pipeline_subscribe_envelopes_lagged_total",
        "Envelopes lost because the subscriber fell behind"
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Registering twice is not an error.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(ENVELOPES_PUBLISHED.clone()),
        Box::new(VERSIONS_FAILED.clone()),
        Box::new(ENVELOPES_HANDLED.clone()),
        Box::new(ENVELOPES_REJECTED.clone()),
        Box::new(ENVELOPES_LAGGED.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
