//! # Channel Subscriber
//!
//! Defines the subscription side of the bus.

use crate::messages::{ChannelFilter, ChannelMessage};
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::Stream;
use tracing::warn;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The bus was closed.
    #[error("Channel bus closed")]
    Closed,
}

/// A subscription handle for receiving messages.
pub struct Subscription {
    /// The broadcast receiver.
    receiver: broadcast::Receiver<ChannelMessage>,

    /// Filter for this subscription.
    filter: ChannelFilter,

    /// Messages overwritten before this receiver read them.
    lagged: u64,
}

impl Subscription {
    /// Create a new subscription.
    pub(crate) fn new(receiver: broadcast::Receiver<ChannelMessage>, filter: ChannelFilter) -> Self {
        Self {
            receiver,
            filter,
            lagged: 0,
        }
    }

    /// Receive the next message that matches the filter.
    ///
    /// # Returns
    ///
    /// - `Some(message)` - The next matching message
    /// - `None` - The bus was closed and the buffer is drained
    pub async fn recv(&mut self) -> Option<ChannelMessage> {
        loop {
            let message = match self.receiver.recv().await {
                Ok(m) => m,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!(lagged = count, "Subscriber lagged, some messages dropped");
                    self.lagged += count;
                    continue;
                }
            };

            if self.filter.matches(&message) {
                return Some(message);
            }
        }
    }

    /// Try to receive the next message without blocking.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(message))` - A message was available and matched
    /// - `Ok(None)` - No message available (would block)
    /// - `Err(SubscriptionError::Closed)` - The bus was closed
    pub fn try_recv(&mut self) -> Result<Option<ChannelMessage>, SubscriptionError> {
        loop {
            let message = match self.receiver.try_recv() {
                Ok(m) => m,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(count)) => {
                    warn!(lagged = count, "Subscriber lagged, some messages dropped");
                    self.lagged += count;
                    continue;
                }
            };

            if self.filter.matches(&message) {
                return Ok(Some(message));
            }
        }
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &ChannelFilter {
        &self.filter
    }

    /// Total messages lost because this receiver fell behind.
    #[must_use]
    pub fn lagged(&self) -> u64 {
        self.lagged
    }

    /// Convert into a `Stream` of matching messages.
    #[must_use]
    pub fn into_stream(self) -> ChannelStream {
        ChannelStream {
            inner: BroadcastStream::new(self.receiver),
            filter: self.filter,
            lagged: self.lagged,
        }
    }
}

/// A stream of messages matching a filter.
///
/// Implements `tokio_stream::Stream` for use with stream combinators.
pub struct ChannelStream {
    inner: BroadcastStream<ChannelMessage>,
    filter: ChannelFilter,
    lagged: u64,
}

impl ChannelStream {
    /// Get the filter for this stream.
    #[must_use]
    pub fn channel_filter(&self) -> &ChannelFilter {
        &self.filter
    }

    /// Total messages lost because this stream fell behind.
    ///
    /// Lost messages are never yielded. Compare between items to notice them.
    #[must_use]
    pub fn lagged(&self) -> u64 {
        self.lagged
    }
}

impl Stream for ChannelStream {
    type Item = ChannelMessage;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match ready!(Pin::new(&mut self.inner).poll_next(cx)) {
                Some(Ok(message)) => {
                    if self.filter.matches(&message) {
                        return Poll::Ready(Some(message));
                    }
                }
                Some(Err(BroadcastStreamRecvError::Lagged(count))) => {
                    warn!(lagged = count, "Stream lagged, some messages dropped");
                    self.lagged += count;
                }
                None => return Poll::Ready(None),
            }
        }
    }
}
