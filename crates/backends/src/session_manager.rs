//! Mobile-core session manager client.

use std::time::Duration;

use aaa_core::{CreateSessionResponse, MacAddress, RatType, Result, SubscriberId};
use async_trait::async_trait;
use serde::Serialize;
use telemetry::health;

use crate::http::JsonClient;

/// Request to open a backend accounting session for a WLAN client.
#[derive(Debug, Clone, Serialize)]
pub struct CreateAccountingSessionRequest {
    pub sid: SubscriberId,
    pub ue_ipv4: String,
    pub apn: String,
    pub msisdn: String,
    pub rat_type: RatType,
    pub hardware_addr: MacAddress,
    pub mac_addr: String,
    /// RADIUS-tier session id, for correlation
    pub radius_session_id: String,
}

/// Request to close a backend accounting session.
#[derive(Debug, Clone, Serialize)]
pub struct EndAccountingSessionRequest<'a> {
    pub sid: &'a SubscriberId,
    pub apn: &'a str,
}

#[async_trait]
pub trait SessionManagerClient: Send + Sync {
    /// Creates the accounting session, returning its id.
    async fn create_session(&self, request: CreateAccountingSessionRequest) -> Result<String>;

    async fn end_session(&self, sid: &SubscriberId, apn: &str) -> Result<()>;
}

/// Session manager reached over JSON/HTTP.
#[derive(Debug, Clone)]
pub struct HttpSessionManager {
    client: JsonClient,
}

impl HttpSessionManager {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: JsonClient::new(base_url, timeout, &health().session_manager)?,
        })
    }
}

#[async_trait]
impl SessionManagerClient for HttpSessionManager {
    async fn create_session(&self, request: CreateAccountingSessionRequest) -> Result<String> {
        let response: CreateSessionResponse =
            self.client.post("sessions/create", &request).await?;
        Ok(response.session_id)
    }

    async fn end_session(&self, sid: &SubscriberId, apn: &str) -> Result<()> {
        self.client
            .post_unit("sessions/end", &EndAccountingSessionRequest { sid, apn })
            .await
    }
}
