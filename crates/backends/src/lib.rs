//! Backend collaborators of the accounting service.
//!
//! Each collaborator is a trait so the orchestrator can be driven by mocks;
//! the `Http*` types are JSON-over-HTTP implementations used in production.

pub mod config;
pub mod directory;
pub mod flow_controller;
mod http;
pub mod radius;
pub mod registry;
pub mod session_manager;

pub use config::*;
pub use directory::*;
pub use flow_controller::*;
pub use radius::*;
pub use registry::*;
pub use session_manager::*;
