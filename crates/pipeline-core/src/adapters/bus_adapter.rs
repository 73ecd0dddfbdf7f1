//! Channel Bus Adapter for the subscriber side
//!
//! Subscribes to the shared-bus and feeds every matching message to a
//! `SubscriberApi` as a transport delivery callback would. Handling errors
//! are logged and counted; retry and dead-lettering belong to the transport.

use crate::metrics::{MetricsRecorder, NoOpMetrics};
use crate::ports::SubscriberApi;
use shared_bus::{ChannelFilter, ChannelStream, InMemoryChannelBus, SubscriptionError};
use std::sync::Arc;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, warn};

/// Counts from one `run` of the adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdapterReport {
    /// Envelopes handled successfully (including ignored ones)
    pub handled: u64,
    /// Envelopes that failed
    pub failed: u64,
    /// Envelopes the bus dropped before this adapter read them
    pub lagged: u64,
}

/// Bus adapter driving a subscriber
pub struct SubscriberBusAdapter<A: SubscriberApi> {
    subscriber: Arc<A>,
    stream: ChannelStream,
    metrics: Arc<dyn MetricsRecorder>,
}

impl<A: SubscriberApi> SubscriberBusAdapter<A> {
    /// Subscribe to `filter` immediately so no message published after this
    /// call is missed.
    pub fn new(
        bus: &InMemoryChannelBus,
        subscriber: Arc<A>,
        filter: ChannelFilter,
    ) -> Result<Self, SubscriptionError> {
        let stream = bus.stream(filter)?;
        Ok(Self {
            subscriber,
            stream,
            metrics: Arc::new(NoOpMetrics),
        })
    }

    /// Replace the metrics recorder used for lag accounting.
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn filter(&self) -> &ChannelFilter {
        self.stream.channel_filter()
    }

    /// Handle messages until the bus is closed.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) -> AdapterReport {
        info!(filter = ?self.stream.channel_filter(), "[SubscriberBusAdapter] Started listening");
        let mut report = AdapterReport::default();

        loop {
            let next = self.stream.next().await;
            self.account_lag(&mut report);

            match next {
                Some(message) => match self.subscriber.handle_bytes(&message.payload).await {
                    Ok(outcome) => {
                        debug!(channel = %message.channel, ?outcome, "Handled message");
                        report.handled += 1;
                    }
                    Err(e) => {
                        error!(channel = %message.channel, kind = e.kind(), "Error handling message: {}", e);
                        report.failed += 1;
                    }
                },
                None => {
                    warn!("[SubscriberBusAdapter] Channel stream ended, shutting down");
                    break;
                }
            }
        }

        report
    }

    fn account_lag(&self, report: &mut AdapterReport) {
        let total = self.stream.lagged();
        if total > report.lagged {
            let dropped = total - report.lagged;
            warn!(
                dropped,
                total, "[SubscriberBusAdapter] Envelopes lost, subscriber fell behind the bus"
            );
            self.metrics.record_envelopes_lagged(dropped);
            report.lagged = total;
        }
    }
}
