//! Backend accounting session creation.

use std::time::Instant;

use aaa_core::{
    require_context, AaaContext, CreateSessionResponse, Error, MacAddress, RatType, Result,
    SubscriberId,
};
use backends::CreateAccountingSessionRequest;
use telemetry::metrics;
use tracing::{debug, error, info};

use crate::AccountingService;

impl AccountingService {
    /// Installs the client's data-plane flows and opens its session manager
    /// session.
    ///
    /// If the session manager refuses, the flows just installed are deleted
    /// again before the error is returned.
    pub async fn create_session(&self, ctx: &AaaContext) -> Result<CreateSessionResponse> {
        let ctx = require_context(Some(ctx), "AAA context")?;
        let started = Instant::now();

        let hardware_addr = MacAddress::parse(&ctx.mac_addr)?;
        let sid = SubscriberId::from_imsi(&ctx.imsi);

        self.install_or_recycle_flow(&sid, ctx)
            .await
            .map_err(|e| Error::internal(format!("install MAC flow: {}", e)))?;

        let request = CreateAccountingSessionRequest {
            sid: sid.clone(),
            ue_ipv4: ctx.ip_addr.clone(),
            apn: ctx.apn.clone(),
            msisdn: ctx.msisdn.clone(),
            rat_type: RatType::TgppWlan,
            hardware_addr,
            mac_addr: ctx.mac_addr.clone(),
            radius_session_id: ctx.session_id.clone(),
        };

        match self.backends.session_manager.create_session(request).await {
            Ok(acct_session_id) => {
                metrics()
                    .create_session_latency_ms
                    .observe(started.elapsed().as_millis() as u64);
                info!(
                    session_id = %ctx.session_id,
                    acct_session_id = %acct_session_id,
                    "Accounting session created"
                );
                Ok(CreateSessionResponse {
                    session_id: acct_session_id,
                })
            }
            Err(e) => {
                metrics().create_session_errors.inc();
                if let Err(rollback) = self.backends.flows.delete_flow(&sid, ctx).await {
                    metrics().flow_rollback_failures.inc();
                    error!(
                        session_id = %ctx.session_id,
                        "Failed to delete MAC flow after session create error: {}", rollback
                    );
                }
                Err(e.into_internal())
            }
        }
    }

    /// Updates the flow in place when the subscriber already holds an
    /// accounting session, installs a fresh one otherwise.
    async fn install_or_recycle_flow(&self, sid: &SubscriberId, ctx: &AaaContext) -> Result<()> {
        if self.is_recycled(&ctx.imsi) {
            debug!(session_id = %ctx.session_id, "Recycled session, updating IPFIX flow");
            self.backends.flows.update_flow(sid, ctx).await
        } else {
            debug!(session_id = %ctx.session_id, "Installing MAC flow");
            self.backends.flows.install_flow(sid, ctx).await
        }
    }

    fn is_recycled(&self, imsi: &str) -> bool {
        self.sessions
            .get_session_by_imsi(imsi)
            .map(|session| session.lock().has_accounting_session())
            .unwrap_or(false)
    }
}
