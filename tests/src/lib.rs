//! # Envelope Pipeline Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Emit and decode throughput
//! └── src/
//!     ├── fixtures.rs   # Sources, payloads, targets and test doubles
//!     └── integration/  # Emitter -> transport -> Subscriber flows
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p pipeline-tests
//!
//! # By category
//! cargo test -p pipeline-tests integration::emit_flows
//! cargo test -p pipeline-tests integration::subscribe_flows
//!
//! # Benchmarks
//! cargo bench -p pipeline-tests
//! ```
