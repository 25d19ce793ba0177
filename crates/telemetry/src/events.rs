//! Session termination events.
//!
//! Every terminal lifecycle transition reports exactly one event, either
//! succeeded or failed. Sinks are fire-and-forget.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tracing target session events are written to.
pub const EVENTS_TARGET: &str = "aaa_events";

/// Lifecycle transition that ended the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationSource {
    #[serde(rename = "Accounting Stop")]
    AccountingStop,
    #[serde(rename = "Session Timeout")]
    SessionTimeout,
    #[serde(rename = "Session Terminate")]
    SessionTerminate,
    /// Timeout notification that arrived without a session context.
    #[serde(rename = "Session Timeout Notification")]
    TimeoutNotification,
}

impl TerminationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccountingStop => "Accounting Stop",
            Self::SessionTimeout => "Session Timeout",
            Self::SessionTerminate => "Session Terminate",
            Self::TimeoutNotification => "Session Timeout Notification",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationOutcome {
    Succeeded,
    Failed,
}

/// One session termination event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTerminationEvent {
    pub event_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub source: TerminationSource,
    pub outcome: TerminationOutcome,
    pub session_id: String,
    pub imsi: String,
    pub apn: String,
    pub mac_addr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SessionTerminationEvent {
    fn new(source: TerminationSource, outcome: TerminationOutcome) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source,
            outcome,
            session_id: String::new(),
            imsi: String::new(),
            apn: String::new(),
            mac_addr: String::new(),
            error: None,
        }
    }

    pub fn succeeded(source: TerminationSource) -> Self {
        Self::new(source, TerminationOutcome::Succeeded)
    }

    pub fn failed(source: TerminationSource, error: impl Into<String>) -> Self {
        let mut event = Self::new(source, TerminationOutcome::Failed);
        event.error = Some(error.into());
        event
    }

    pub fn with_session(
        mut self,
        session_id: impl Into<String>,
        imsi: impl Into<String>,
        apn: impl Into<String>,
        mac_addr: impl Into<String>,
    ) -> Self {
        self.session_id = session_id.into();
        self.imsi = imsi.into();
        self.apn = apn.into();
        self.mac_addr = mac_addr.into();
        self
    }
}

/// Sink for session termination events.
pub trait EventLogger: Send + Sync {
    fn log_termination(&self, event: SessionTerminationEvent);
}

/// Writes events as JSON on the [`EVENTS_TARGET`] tracing target.
#[derive(Debug, Default, Clone)]
pub struct TracingEventLogger;

impl EventLogger for TracingEventLogger {
    fn log_termination(&self, event: SessionTerminationEvent) {
        let payload = match serde_json::to_string(&event) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Failed to serialize session event: {}", e);
                return;
            }
        };

        match event.outcome {
            TerminationOutcome::Succeeded => tracing::info!(
                target: EVENTS_TARGET,
                source = event.source.as_str(),
                session_id = %event.session_id,
                event = %payload,
                "session_terminated"
            ),
            TerminationOutcome::Failed => tracing::warn!(
                target: EVENTS_TARGET,
                source = event.source.as_str(),
                session_id = %event.session_id,
                event = %payload,
                "session_termination_failed"
            ),
        }
    }
}
