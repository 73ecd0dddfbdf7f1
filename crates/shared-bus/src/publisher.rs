//! # Publisher
//!
//! Defines the publishing side of the bus and the in-memory implementation.

use crate::messages::{ChannelFilter, ChannelMessage};
use crate::subscriber::{ChannelStream, Subscription, SubscriptionError};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Errors from publishing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// The bus was closed.
    #[error("Channel bus closed")]
    Closed,

    /// The payload exceeds the transport's size limit.
    #[error("Payload of {size} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },

    /// The transport refused the message.
    #[error("Publish to {channel} rejected: {reason}")]
    Rejected { channel: String, reason: String },
}

/// Trait for delivering raw bytes to a named channel.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish bytes to a channel.
    ///
    /// # Returns
    ///
    /// The number of active subscribers that received the message.
    ///
    /// # Errors
    ///
    /// Any transport failure; the message must be considered undelivered.
    async fn publish(&self, channel: &str, payload: Vec<u8>) -> Result<usize, PublishError>;
}

#[async_trait]
impl<T: Publisher + ?Sized> Publisher for Arc<T> {
    async fn publish(&self, channel: &str, payload: Vec<u8>) -> Result<usize, PublishError> {
        (**self).publish(channel, payload).await
    }
}

/// In-memory implementation of the channel bus.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer semantics.
/// Suitable for single-process operation and tests; distributed deployments
/// plug a broker client in behind `Publisher`.
pub struct InMemoryChannelBus {
    /// Broadcast sender. `None` once the bus is closed.
    sender: RwLock<Option<broadcast::Sender<ChannelMessage>>>,

    /// Total publish attempts.
    messages_published: AtomicU64,

    /// Channel capacity.
    capacity: usize,

    /// Largest accepted payload.
    max_payload_bytes: Option<usize>,
}

impl InMemoryChannelBus {
    /// Create a new bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: RwLock::new(Some(sender)),
            messages_published: AtomicU64::new(0),
            capacity,
            max_payload_bytes: None,
        }
    }

    /// Reject payloads larger than `limit` bytes.
    #[must_use]
    pub fn with_max_payload_bytes(mut self, limit: usize) -> Self {
        self.max_payload_bytes = Some(limit);
        self
    }

    /// Subscribe to messages matching a filter.
    ///
    /// # Errors
    ///
    /// Returns `SubscriptionError::Closed` if the bus was closed.
    pub fn subscribe(&self, filter: ChannelFilter) -> Result<Subscription, SubscriptionError> {
        let guard = self.sender.read().map_err(|_| SubscriptionError::Closed)?;
        let sender = guard.as_ref().ok_or(SubscriptionError::Closed)?;

        debug!(channels = ?filter.channels, prefix = ?filter.prefix, "New subscription created");

        Ok(Subscription::new(sender.subscribe(), filter))
    }

    /// Get a stream of messages matching a filter.
    ///
    /// # Errors
    ///
    /// Returns `SubscriptionError::Closed` if the bus was closed.
    pub fn stream(&self, filter: ChannelFilter) -> Result<ChannelStream, SubscriptionError> {
        self.subscribe(filter).map(Subscription::into_stream)
    }

    /// Close the bus. Subscribers drain what is buffered and then end.
    pub fn close(&self) {
        if let Ok(mut guard) = self.sender.write() {
            if guard.take().is_some() {
                debug!("Channel bus closed");
            }
        }
    }

    /// Whether `close()` has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.read().map(|g| g.is_none()).unwrap_or(true)
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender
            .read()
            .ok()
            .and_then(|g| g.as_ref().map(broadcast::Sender::receiver_count))
            .unwrap_or(0)
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the total number of publish attempts.
    #[must_use]
    pub fn messages_published(&self) -> u64 {
        self.messages_published.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryChannelBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Publisher for InMemoryChannelBus {
    async fn publish(&self, channel: &str, payload: Vec<u8>) -> Result<usize, PublishError> {
        // Always increment counter (publish was attempted)
        self.messages_published.fetch_add(1, Ordering::Relaxed);

        if let Some(limit) = self.max_payload_bytes {
            if payload.len() > limit {
                warn!(channel, size = payload.len(), limit, "Payload rejected (too large)");
                return Err(PublishError::PayloadTooLarge {
                    size: payload.len(),
                    limit,
                });
            }
        }

        let sender = {
            let guard = self.sender.read().map_err(|_| PublishError::Closed)?;
            guard.as_ref().cloned().ok_or(PublishError::Closed)?
        };

        let size = payload.len();
        match sender.send(ChannelMessage::new(channel, payload)) {
            Ok(receivers) => {
                debug!(channel, bytes = size, receivers, "Message published");
                Ok(receivers)
            }
            Err(_) => {
                // No receivers - message is dropped
                warn!(channel, bytes = size, "Message dropped (no receivers)");
                Ok(0)
            }
        }
    }
}
