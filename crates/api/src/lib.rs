//! HTTP API layer for the AAA accounting service.

pub mod response;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
