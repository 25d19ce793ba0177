//! Packet-flow controller: per-UE MAC flows and IPFIX export flows.

use std::time::Duration;

use aaa_core::{AaaContext, Result, SubscriberId};
use async_trait::async_trait;
use serde::Serialize;
use telemetry::health;

use crate::http::JsonClient;

/// Installs and removes data-plane flows for a client.
#[async_trait]
pub trait FlowController: Send + Sync {
    /// Installs the MAC flows of a brand new session.
    async fn install_flow(&self, sid: &SubscriberId, ctx: &AaaContext) -> Result<()>;

    /// Corrects the flow classification of a recycled session in place.
    async fn update_flow(&self, sid: &SubscriberId, ctx: &AaaContext) -> Result<()>;

    /// Deletes the client's MAC flows.
    async fn delete_flow(&self, sid: &SubscriberId, ctx: &AaaContext) -> Result<()>;
}

/// Flow request body.
#[derive(Debug, Serialize)]
struct FlowRequest<'a> {
    sid: &'a SubscriberId,
    session_id: &'a str,
    mac_addr: &'a str,
    ip_addr: &'a str,
    apn: &'a str,
    msisdn: &'a str,
}

impl<'a> FlowRequest<'a> {
    fn new(sid: &'a SubscriberId, ctx: &'a AaaContext) -> Self {
        Self {
            sid,
            session_id: &ctx.session_id,
            mac_addr: &ctx.mac_addr,
            ip_addr: &ctx.ip_addr,
            apn: &ctx.apn,
            msisdn: &ctx.msisdn,
        }
    }
}

/// Flow controller reached over JSON/HTTP.
#[derive(Debug, Clone)]
pub struct HttpFlowController {
    client: JsonClient,
}

impl HttpFlowController {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: JsonClient::new(base_url, timeout, &health().flow_controller)?,
        })
    }
}

#[async_trait]
impl FlowController for HttpFlowController {
    async fn install_flow(&self, sid: &SubscriberId, ctx: &AaaContext) -> Result<()> {
        self.client
            .post_unit("flows/install", &FlowRequest::new(sid, ctx))
            .await
    }

    async fn update_flow(&self, sid: &SubscriberId, ctx: &AaaContext) -> Result<()> {
        self.client
            .post_unit("flows/update", &FlowRequest::new(sid, ctx))
            .await
    }

    async fn delete_flow(&self, sid: &SubscriberId, ctx: &AaaContext) -> Result<()> {
        self.client
            .post_unit("flows/delete", &FlowRequest::new(sid, ctx))
            .await
    }
}
