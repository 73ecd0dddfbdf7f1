//! Adapters Layer
//!
//! Connects the service layer to the channel bus.

pub mod bus_adapter;

pub use bus_adapter::{AdapterReport, SubscriberBusAdapter};
