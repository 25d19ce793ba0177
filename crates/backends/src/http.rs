//! Shared JSON-over-HTTP plumbing for the backend clients.

use std::time::Duration;

use aaa_core::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use telemetry::PeerHealth;
use tracing::debug;
use url::Url;

/// JSON client bound to one peer.
#[derive(Debug, Clone)]
pub(crate) struct JsonClient {
    base: Url,
    http: reqwest::Client,
    peer: &'static PeerHealth,
}

impl JsonClient {
    pub(crate) fn new(base: &str, timeout: Duration, peer: &'static PeerHealth) -> Result<Self> {
        let base = parse_base_url(base)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { base, http, peer })
    }

    /// POSTs `body` and decodes the JSON response.
    pub(crate) async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.url(path)?;
        let response = self.send(self.http.post(url).json(body)).await?;
        response
            .json::<R>()
            .await
            .map_err(|e| Error::internal(format!("{}: invalid response: {}", self.peer.name(), e)))
    }

    /// POSTs `body`, ignoring the response body.
    pub(crate) async fn post_unit<B>(&self, path: &str, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        self.send(self.http.post(url).json(body)).await.map(|_| ())
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path)?;
        self.send(self.http.delete(url)).await.map(|_| ())
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| Error::internal(format!("invalid {} path {:?}: {}", self.peer.name(), path, e)))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Err(self.transport_error(e)),
        };
        self.peer.record_success();

        let status = response.status();
        if status.is_success() {
            debug!(peer = self.peer.name(), status = %status, "Backend call succeeded");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(Error::internal(format!(
            "{} returned {}: {}",
            self.peer.name(),
            status,
            body
        )))
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        let msg = format!("{}: {}", self.peer.name(), e);
        if e.is_connect() || e.is_timeout() {
            self.peer.record_failure(msg.clone());
            Error::unavailable(msg)
        } else {
            Error::internal(msg)
        }
    }
}

/// Parses a peer base URL, making sure relative paths join beneath it.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)
        .map_err(|e| Error::invalid_argument(format!("invalid peer URL {:?}: {}", raw, e)))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
