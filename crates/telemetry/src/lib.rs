//! Internal telemetry for the AAA accounting service.
//!
//! Metrics are collected in-process and exposed as a snapshot; session
//! termination events are emitted as structured tracing records.

pub mod events;
pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use events::*;
pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
