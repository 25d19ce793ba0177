//! The accounting service and its collaborators.

use std::sync::Arc;
use std::time::Duration;

use aaa_core::{AaaConfig, AaaContext, Error, Result};
use backends::{ConnectionRegistry, DirectoryClient, FlowController, SessionManagerClient};
use session_table::{timeout_queue, Session, SessionTable, TimeoutNotifier, TimeoutReceiver};
use telemetry::{EventLogger, SessionTerminationEvent, TerminationSource};
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Backend collaborators the service fans out to.
#[derive(Clone)]
pub struct Backends {
    pub flows: Arc<dyn FlowController>,
    pub session_manager: Arc<dyn SessionManagerClient>,
    pub directory: Arc<dyn DirectoryClient>,
    pub registry: Arc<dyn ConnectionRegistry>,
    pub events: Arc<dyn EventLogger>,
}

/// Orchestrates the accounting session lifecycle.
pub struct AccountingService {
    pub(crate) sessions: SessionTable,
    pub(crate) config: AaaConfig,
    pub(crate) session_timeout: Duration,
    pub(crate) backends: Backends,
    pub(crate) notifier: Arc<dyn TimeoutNotifier>,
}

impl AccountingService {
    /// Creates a service whose idle timeouts go to `notifier`.
    pub fn new(
        sessions: SessionTable,
        config: AaaConfig,
        backends: Backends,
        notifier: Arc<dyn TimeoutNotifier>,
    ) -> Self {
        let session_timeout = config.idle_session_timeout();
        Self {
            sessions,
            config,
            session_timeout,
            backends,
            notifier,
        }
    }

    /// Creates a service wired to a fresh timeout queue.
    ///
    /// The receiver must be handed to [`AccountingService::start_timeout_worker`].
    pub fn with_timeout_queue(
        sessions: SessionTable,
        config: AaaConfig,
        backends: Backends,
    ) -> (Arc<Self>, TimeoutReceiver) {
        let (queue, rx) = timeout_queue();
        let service = Arc::new(Self::new(sessions, config, backends, Arc::new(queue)));
        (service, rx)
    }

    pub fn sessions(&self) -> &SessionTable {
        &self.sessions
    }

    pub fn config(&self) -> &AaaConfig {
        &self.config
    }

    pub fn session_timeout(&self) -> Duration {
        self.session_timeout
    }

    /// Inserts a freshly authenticated session and arms its idle timer.
    pub fn add_authenticated_session(&self, ctx: AaaContext) -> Result<Arc<Session>> {
        let session_id = ctx.session_id.clone();
        let session =
            self.sessions
                .add_session(ctx, self.session_timeout, self.notifier.clone(), false)?;
        info!(session_id = %session_id, "Authenticated session added");
        Ok(session)
    }

    /// Drains expired sessions, ending each one on its own task.
    pub fn start_timeout_worker(self: Arc<Self>, mut rx: TimeoutReceiver) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let service = self.clone();
                tokio::spawn(async move {
                    let session_id = event.ctx.session_id.clone();
                    if let Err(e) = service.end_timed_out_session(Some(&event.ctx)).await {
                        error!(session_id = %session_id, "Failed to end timed out session: {}", e);
                    }
                });
            }
            info!("Timeout queue closed, timeout worker exiting");
        })
    }

    /// Emits one termination event if event logging is enabled.
    pub(crate) fn log_termination(
        &self,
        source: TerminationSource,
        ctx: Option<&AaaContext>,
        err: Option<&Error>,
    ) {
        if !self.config.event_logging_enabled {
            return;
        }

        let event = match err {
            Some(e) => SessionTerminationEvent::failed(source, e.to_string()),
            None => SessionTerminationEvent::succeeded(source),
        };
        let event = match ctx {
            Some(ctx) => event.with_session(&ctx.session_id, &ctx.imsi, &ctx.apn, &ctx.mac_addr),
            None => event,
        };
        self.backends.events.log_termination(event);
    }
}
