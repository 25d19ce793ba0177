//! Backend peer configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Addresses of the backend peers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendsConfig {
    /// Packet-flow controller base URL
    #[serde(default = "default_flow_controller_url")]
    pub flow_controller_url: String,
    /// Mobile-core session manager base URL
    #[serde(default = "default_session_manager_url")]
    pub session_manager_url: String,
    /// Subscriber directory base URL
    #[serde(default = "default_directory_url")]
    pub directory_url: String,
    /// RADIUS server base URL; unset means RADIUS notifications are unavailable
    #[serde(default)]
    pub radius_url: Option<String>,
    /// Per-request timeout in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_flow_controller_url() -> String {
    "http://127.0.0.1:50063/".to_string()
}

fn default_session_manager_url() -> String {
    "http://127.0.0.1:50065/".to_string()
}

fn default_directory_url() -> String {
    "http://127.0.0.1:50067/".to_string()
}

fn default_request_timeout_ms() -> u64 {
    5000
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            flow_controller_url: default_flow_controller_url(),
            session_manager_url: default_session_manager_url(),
            directory_url: default_directory_url(),
            radius_url: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl BackendsConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
