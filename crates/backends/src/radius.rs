//! RADIUS server notifications.

use std::time::Duration;

use aaa_core::{AaaContext, Result};
use async_trait::async_trait;
use serde::Serialize;
use telemetry::health;

use crate::http::JsonClient;

/// Asks the RADIUS tier to disconnect a client.
#[async_trait]
pub trait RadiusNotifier: Send + Sync {
    async fn disconnect(&self, ctx: &AaaContext) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct DisconnectRequest<'a> {
    ctx: &'a AaaContext,
}

/// RADIUS server reached over JSON/HTTP.
#[derive(Debug, Clone)]
pub struct HttpRadiusClient {
    client: JsonClient,
}

impl HttpRadiusClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: JsonClient::new(base_url, timeout, &health().radius)?,
        })
    }
}

#[async_trait]
impl RadiusNotifier for HttpRadiusClient {
    async fn disconnect(&self, ctx: &AaaContext) -> Result<()> {
        self.client
            .post_unit("disconnect", &DisconnectRequest { ctx })
            .await
    }
}
