//! Backend peer reachability.
//!
//! Each peer is marked by the outcome of its most recent call. A peer that
//! has never been called counts as reachable.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};

/// Health status for the service as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// Reachability of one backend peer.
#[derive(Debug)]
pub struct PeerHealth {
    name: &'static str,
    reachable: AtomicBool,
    last_error: parking_lot::RwLock<Option<String>>,
}

impl PeerHealth {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            reachable: AtomicBool::new(true),
            last_error: parking_lot::RwLock::new(None),
        }
    }

    pub fn record_success(&self) {
        self.reachable.store(true, Ordering::Relaxed);
        *self.last_error.write() = None;
    }

    pub fn record_failure(&self, msg: impl Into<String>) {
        self.reachable.store(false, Ordering::Relaxed);
        *self.last_error.write() = Some(msg.into());
    }

    pub fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::Relaxed)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    fn report(&self) -> PeerHealthReport {
        PeerHealthReport {
            name: self.name.to_string(),
            reachable: self.is_reachable(),
            last_error: self.last_error(),
        }
    }
}

/// Aggregated health status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub peers: Vec<PeerHealthReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerHealthReport {
    pub name: String,
    pub reachable: bool,
    pub last_error: Option<String>,
}

/// Registry of backend peers.
pub struct HealthRegistry {
    pub flow_controller: PeerHealth,
    pub session_manager: PeerHealth,
    pub directory: PeerHealth,
    pub radius: PeerHealth,
}

impl HealthRegistry {
    pub const fn new() -> Self {
        Self {
            flow_controller: PeerHealth::new("flow_controller"),
            session_manager: PeerHealth::new("session_manager"),
            directory: PeerHealth::new("directory"),
            radius: PeerHealth::new("radius"),
        }
    }

    /// Generate a health report.
    ///
    /// The directory is best-effort and does not degrade the status.
    pub fn report(&self) -> HealthReport {
        let peers = vec![
            self.flow_controller.report(),
            self.session_manager.report(),
            self.directory.report(),
            self.radius.report(),
        ];

        let critical = [&self.flow_controller, &self.session_manager, &self.radius];
        let down = critical.iter().filter(|p| !p.is_reachable()).count();

        let status = if down == 0 {
            HealthStatus::Healthy
        } else if down < critical.len() {
            HealthStatus::Degraded
        } else {
            HealthStatus::Unhealthy
        };

        HealthReport { status, peers }
    }
}

impl Default for HealthRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global health registry.
pub static HEALTH: HealthRegistry = HealthRegistry::new();

/// Get the global health registry.
pub fn health() -> &'static HealthRegistry {
    &HEALTH
}
