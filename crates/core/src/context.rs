//! AAA session context and lifecycle request/response types.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{strip_imsi_prefix, Error, Result};

/// Accounting context of one authenticated client.
///
/// `session_id` is the RADIUS-tier session identifier and never changes.
/// `acct_session_id` stays empty until the session manager has created the
/// backend accounting session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct AaaContext {
    #[validate(length(min = 1))]
    pub session_id: String,
    #[validate(length(min = 1))]
    pub imsi: String,
    /// EAP identity / RADIUS User-Name
    #[serde(default)]
    pub identity: String,
    #[serde(default)]
    pub msisdn: String,
    #[serde(default)]
    pub apn: String,
    #[serde(default)]
    pub mac_addr: String,
    #[serde(default)]
    pub ip_addr: String,
    #[serde(default)]
    pub acct_session_id: String,
}

impl AaaContext {
    pub fn new(session_id: impl Into<String>, imsi: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            imsi: imsi.into(),
            ..Default::default()
        }
    }

    /// IMSI without the canonical prefix.
    pub fn bare_imsi(&self) -> &str {
        strip_imsi_prefix(&self.imsi)
    }

    pub fn has_accounting_session(&self) -> bool {
        !self.acct_session_id.is_empty()
    }
}

/// Validates a possibly missing context.
pub fn require_context<'a>(ctx: Option<&'a AaaContext>, what: &str) -> Result<&'a AaaContext> {
    let ctx = ctx.ok_or_else(|| Error::invalid_argument(format!("nil {}", what)))?;
    ctx.validate()?;
    Ok(ctx)
}

/// Acct-Status-Type: Interim-Update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub ctx: Option<AaaContext>,
    #[serde(default)]
    pub octets_in: u64,
    #[serde(default)]
    pub octets_out: u64,
    #[serde(default)]
    pub packets_in: u64,
    #[serde(default)]
    pub packets_out: u64,
}

/// Acct-Status-Type: Start.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StartRequest {
    pub ctx: Option<AaaContext>,
}

/// Acct-Status-Type: Stop.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StopRequest {
    pub ctx: Option<AaaContext>,
    #[serde(default)]
    pub cause: Option<String>,
}

/// Session manager notification that a backend session has ended.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TerminateSessionRequest {
    #[validate(length(min = 1))]
    pub radius_session_id: String,
    pub imsi: String,
}

/// Bulk recovery of sessions still known to the session manager.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddSessionsRequest {
    pub sessions: Vec<AaaContext>,
}

/// Minimal acknowledgement shared by the lifecycle calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcctResponse {}

/// Result of creating a backend accounting session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
}
