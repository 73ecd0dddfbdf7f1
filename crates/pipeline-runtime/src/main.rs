//! # Envelope Pipeline Runtime
//!
//! Loads configuration, emits a sample order through its full lifecycle and
//! keeps consuming until Ctrl+C.

use anyhow::Result;
use tracing::{error, info};

use pipeline_runtime::config::RuntimeConfig;
use pipeline_runtime::orders::Order;
use pipeline_runtime::PipelineRuntime;
use shared_types::EventKind;

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env();
    pipeline_telemetry::init_telemetry(&config.telemetry)?;

    let mut runtime = PipelineRuntime::new(config)?;
    runtime.start()?;

    let mut order = Order {
        id: 1,
        sku: "RAZOR-5".to_string(),
        quantity: 1,
        unit_price_cents: 900,
        tenant: None,
    };

    for event_kind in [EventKind::Created, EventKind::Updated, EventKind::Deleted] {
        if let Err(e) = runtime.publish_order(&order, event_kind).await {
            error!("Emit failed: {:#}", e);
        }
        order.quantity += 1;
    }

    info!("Runtime is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    let report = runtime.shutdown().await?;
    info!(handled = report.handled, failed = report.failed, "Bye");

    Ok(())
}
