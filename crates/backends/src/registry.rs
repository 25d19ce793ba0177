//! Peer registry: resolves a service role to a live connection.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use aaa_core::{Error, Result};
use serde::{Deserialize, Serialize};
use telemetry::health;

use crate::{BackendsConfig, HttpRadiusClient, RadiusNotifier};

/// Well-known backend peer roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceRole {
    FlowController,
    SessionManager,
    Directory,
    Radius,
}

impl ServiceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FlowController => "flow_controller",
            Self::SessionManager => "session_manager",
            Self::Directory => "directory",
            Self::Radius => "radius",
        }
    }
}

/// Resolves connections to peers that are looked up per call.
pub trait ConnectionRegistry: Send + Sync {
    /// A fresh connection to the RADIUS server.
    fn radius_notifier(&self) -> Result<Arc<dyn RadiusNotifier>>;
}

/// Registry backed by static peer addresses.
#[derive(Debug, Clone)]
pub struct PeerRegistry {
    peers: HashMap<ServiceRole, String>,
    timeout: Duration,
}

impl PeerRegistry {
    pub fn new(timeout: Duration) -> Self {
        Self {
            peers: HashMap::new(),
            timeout,
        }
    }

    pub fn from_config(config: &BackendsConfig) -> Self {
        let mut registry = Self::new(config.request_timeout());
        registry.register(ServiceRole::FlowController, &config.flow_controller_url);
        registry.register(ServiceRole::SessionManager, &config.session_manager_url);
        registry.register(ServiceRole::Directory, &config.directory_url);
        if let Some(radius_url) = &config.radius_url {
            registry.register(ServiceRole::Radius, radius_url);
        }
        registry
    }

    pub fn register(&mut self, role: ServiceRole, address: impl Into<String>) {
        self.peers.insert(role, address.into());
    }

    /// Address of a peer, UNAVAILABLE if none is registered.
    pub fn address(&self, role: ServiceRole) -> Result<&str> {
        self.peers
            .get(&role)
            .map(String::as_str)
            .ok_or_else(|| Error::unavailable(format!("no address registered for {}", role.as_str())))
    }
}

impl ConnectionRegistry for PeerRegistry {
    fn radius_notifier(&self) -> Result<Arc<dyn RadiusNotifier>> {
        let result = self
            .address(ServiceRole::Radius)
            .and_then(|address| HttpRadiusClient::new(address, self.timeout))
            .map_err(Error::into_unavailable);

        match result {
            Ok(client) => Ok(Arc::new(client)),
            Err(e) => {
                health().radius.record_failure(e.to_string());
                Err(e)
            }
        }
    }
}
