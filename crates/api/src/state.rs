//! Application state shared across handlers.

use std::sync::Arc;

use accounting::AccountingService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AccountingService>,
}

impl AppState {
    pub fn new(service: Arc<AccountingService>) -> Self {
        Self { service }
    }
}
