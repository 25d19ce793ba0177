//! Subscriber directory client.

use std::time::Duration;

use aaa_core::Result;
use async_trait::async_trait;
use telemetry::health;

use crate::http::JsonClient;

/// Location records of attached subscribers.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    async fn delete_record(&self, imsi: &str) -> Result<()>;
}

/// Directory reached over JSON/HTTP.
#[derive(Debug, Clone)]
pub struct HttpDirectory {
    client: JsonClient,
}

impl HttpDirectory {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: JsonClient::new(base_url, timeout, &health().directory)?,
        })
    }
}

#[async_trait]
impl DirectoryClient for HttpDirectory {
    async fn delete_record(&self, imsi: &str) -> Result<()> {
        self.client.delete(&format!("records/{}", imsi)).await
    }
}
