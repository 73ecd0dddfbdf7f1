//! # Shared Bus - Named-Channel Transport
//!
//! Delivers opaque bytes to named channels. Producers only see the
//! `Publisher` trait; consumers subscribe with a `ChannelFilter`.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │   Emitter    │                    │  Subscriber  │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │ Channel Bus  │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! The bus never inspects payloads. Everything on it is an encrypted
//! envelope.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod messages;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use messages::{ChannelFilter, ChannelMessage};
pub use publisher::{InMemoryChannelBus, PublishError, Publisher};
pub use subscriber::{ChannelStream, Subscription, SubscriptionError};

/// Maximum messages to buffer per subscriber before the oldest are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
