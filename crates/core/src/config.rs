//! AAA accounting configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Idle session timeout used when none is configured (6 hours).
pub const DEFAULT_IDLE_SESSION_TIMEOUT_MS: u64 = 6 * 60 * 60 * 1000;

/// Accounting behaviour flags, read-only to this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AaaConfig {
    /// Create and end backend accounting sessions on the session manager.
    /// When disabled, terminations only delete the directory record.
    #[serde(default = "default_true")]
    pub accounting_enabled: bool,
    /// Backend sessions are created at authentication time, so Start only
    /// extends the idle timer.
    #[serde(default)]
    pub create_session_on_auth: bool,
    /// Emit session termination events
    #[serde(default)]
    pub event_logging_enabled: bool,
    /// Idle session timeout in milliseconds (0 = default)
    #[serde(default)]
    pub idle_session_timeout_ms: u64,
}

fn default_true() -> bool {
    true
}

impl Default for AaaConfig {
    fn default() -> Self {
        Self {
            accounting_enabled: true,
            create_session_on_auth: false,
            event_logging_enabled: false,
            idle_session_timeout_ms: 0,
        }
    }
}

impl AaaConfig {
    /// Returns the effective idle session timeout.
    pub fn idle_session_timeout(&self) -> Duration {
        if self.idle_session_timeout_ms == 0 {
            Duration::from_millis(DEFAULT_IDLE_SESSION_TIMEOUT_MS)
        } else {
            Duration::from_millis(self.idle_session_timeout_ms)
        }
    }
}
