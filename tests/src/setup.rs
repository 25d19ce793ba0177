//! Common test setup.

use std::sync::Arc;
use std::time::Duration;

use aaa_core::{AaaConfig, AaaContext};
use accounting::{AccountingService, Backends};
use api::{router, state::AppState};
use axum::Router;
use axum_test::TestServer;
use session_table::{Session, SessionTable};
use tokio::task::JoinHandle;

use crate::mocks::{
    MockDirectory, MockEventLogger, MockFlowController, MockRadius, MockRegistry,
    MockSessionManager,
};

/// Idle timeout used by [`TestContext::new`].
pub const TEST_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// An accounting service wired to mock backends.
///
/// Uses the real session table, timeout queue, timeout worker and Axum
/// router; only the remote peers are mocked.
pub struct TestContext {
    pub service: Arc<AccountingService>,
    pub flows: Arc<MockFlowController>,
    pub session_manager: Arc<MockSessionManager>,
    pub directory: Arc<MockDirectory>,
    pub radius: Arc<MockRadius>,
    pub registry: Arc<MockRegistry>,
    pub events: Arc<MockEventLogger>,
    pub router: Router,
    timeout_worker: JoinHandle<()>,
}

impl TestContext {
    /// Accounting enabled, sessions created on Start, events logged.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new() -> Self {
        Self::with_config(Self::default_config())
    }

    pub fn default_config() -> AaaConfig {
        AaaConfig {
            accounting_enabled: true,
            create_session_on_auth: false,
            event_logging_enabled: true,
            idle_session_timeout_ms: TEST_IDLE_TIMEOUT.as_millis() as u64,
        }
    }

    pub fn with_config(config: AaaConfig) -> Self {
        let flows = Arc::new(MockFlowController::new());
        let session_manager = Arc::new(MockSessionManager::new());
        let directory = Arc::new(MockDirectory::new());
        let radius = Arc::new(MockRadius::new());
        let registry = Arc::new(MockRegistry::new(radius.clone()));
        let events = Arc::new(MockEventLogger::new());

        let backends = Backends {
            flows: flows.clone(),
            session_manager: session_manager.clone(),
            directory: directory.clone(),
            registry: registry.clone(),
            events: events.clone(),
        };

        let (service, timeout_rx) =
            AccountingService::with_timeout_queue(SessionTable::new(), config, backends);
        let timeout_worker = service.clone().start_timeout_worker(timeout_rx);
        let router = router(AppState::new(service.clone()));

        Self {
            service,
            flows,
            session_manager,
            directory,
            radius,
            registry,
            events,
            router,
            timeout_worker,
        }
    }

    /// Inserts an authenticated session the way the authenticator would.
    pub fn authenticate(&self, ctx: &AaaContext) -> Arc<Session> {
        self.service
            .add_authenticated_session(ctx.clone())
            .expect("Failed to add authenticated session")
    }

    pub fn is_live(&self, session_id: &str) -> bool {
        self.service.sessions().get_session(session_id).is_some()
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.router.clone()).expect("Failed to create test server")
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.timeout_worker.abort();
    }
}

/// Polls `condition` until it holds, yielding to spawned tasks in between.
///
/// Under a paused clock each round also advances time by a millisecond.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    condition()
}
