//! # Pipeline Telemetry
//!
//! Logging and metrics for pipeline hosts.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pipeline_telemetry::{init_telemetry, PrometheusRecorder, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_telemetry(&TelemetryConfig::from_env())?;
//!     let emitter = emitter.with_metrics(Arc::new(PrometheusRecorder));
//!     // ...
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `envelope-pipeline` | Service name in logs |
//! | `PIPELINE_LOG_LEVEL` | `info` | Log level filter |
//! | `PIPELINE_JSON_LOGS` | `false` | JSON output (default on in containers) |
//! | `PIPELINE_METRICS` | `true` | Register Prometheus metrics |

mod config;
mod logging;
pub mod metrics;
mod recorder;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{encode_metrics, register_metrics};
pub use recorder::PrometheusRecorder;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Register metrics (if enabled) and install the global log subscriber.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    if config.metrics_enabled {
        register_metrics()?;
    }
    init_logging(config)
}
