//! Core types for the AAA accounting service.
//!
//! Shared by the session table, the backend adapters and the accounting
//! orchestrator: the per-session AAA context, request/response shapes,
//! subscriber identity helpers and the unified error type.

pub mod config;
pub mod context;
pub mod error;
pub mod mac;
pub mod subscriber;

pub use config::*;
pub use context::*;
pub use error::{Error, ErrorCode, Result};
pub use mac::MacAddress;
pub use subscriber::*;
