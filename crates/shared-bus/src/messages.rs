//! # Channel Messages
//!
//! What travels on the bus, and how subscribers select it.

/// One delivery: raw bytes addressed to a named channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMessage {
    /// Destination channel name.
    pub channel: String,
    /// Opaque payload (an encoded envelope).
    pub payload: Vec<u8>,
}

impl ChannelMessage {
    /// Create a message.
    #[must_use]
    pub fn new(channel: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            channel: channel.into(),
            payload,
        }
    }
}

/// Filter for subscribing to a subset of channels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelFilter {
    /// Exact channel names to include. Empty means no exact constraint.
    pub channels: Vec<String>,
    /// Channel name prefix to include.
    pub prefix: Option<String>,
}

impl ChannelFilter {
    /// Create a filter that accepts every channel.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific channels.
    #[must_use]
    pub fn channels<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            channels: channels.into_iter().map(Into::into).collect(),
            prefix: None,
        }
    }

    /// Create a filter for every channel starting with `prefix`.
    #[must_use]
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            channels: Vec::new(),
            prefix: Some(prefix.into()),
        }
    }

    /// Check if a message matches this filter.
    ///
    /// A message matches when it is named explicitly or carries the prefix.
    #[must_use]
    pub fn matches(&self, message: &ChannelMessage) -> bool {
        self.matches_channel(&message.channel)
    }

    /// Check a channel name against this filter.
    #[must_use]
    pub fn matches_channel(&self, channel: &str) -> bool {
        if self.channels.is_empty() && self.prefix.is_none() {
            return true;
        }
        self.channels.iter().any(|c| c == channel)
            || self
                .prefix
                .as_deref()
                .is_some_and(|prefix| channel.starts_with(prefix))
    }
}
