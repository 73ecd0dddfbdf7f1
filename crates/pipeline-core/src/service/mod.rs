//! Service Layer
//!
//! Orchestrates domain logic and coordinates with the driven ports.

pub mod emitter;
pub mod subscriber;

pub use emitter::Emitter;
pub use subscriber::Subscriber;
