//! Backend teardown shared by Stop and idle timeouts.

use aaa_core::{decorate_imsi, AaaContext, Error, Result, SubscriberId};
use telemetry::metrics;
use tracing::{debug, warn};

use crate::AccountingService;

/// Failures collected while tearing a timed out session down.
#[derive(Debug, Default)]
pub struct TeardownErrors {
    pub backend: Option<Error>,
    pub radius: Option<Error>,
}

impl TeardownErrors {
    /// Folds the collected failures into one result.
    ///
    /// A lone RADIUS failure is UNAVAILABLE; two failures are reported
    /// together as INTERNAL.
    pub fn into_result(self) -> Result<()> {
        match (self.backend, self.radius) {
            (None, None) => Ok(()),
            (Some(backend), None) => Err(backend),
            (None, Some(radius)) => Err(radius.into_unavailable()),
            (Some(backend), Some(radius)) => Err(Error::combined(
                "session timeout notification errors",
                backend,
                radius,
            )),
        }
    }
}

impl AccountingService {
    /// Ends the backend state of a session that has left the table.
    ///
    /// With accounting enabled this ends the session manager session; a
    /// failure there is UNAVAILABLE. Otherwise the directory record is
    /// deleted on a best-effort basis.
    pub(crate) async fn teardown_backend(&self, ctx: &AaaContext) -> Result<()> {
        let imsi = decorate_imsi(&ctx.imsi);

        if self.config.accounting_enabled {
            let sid = SubscriberId::from_imsi(&ctx.imsi);
            let result = self
                .backends
                .session_manager
                .end_session(&sid, &ctx.apn)
                .await
                .map_err(|e| Error::unavailable(format!("end session {}: {}", ctx.session_id, e)));
            metrics().end_session.inc(&ctx.apn, &imsi);
            return result;
        }

        // Directory records are keyed by the IMSI as stored
        match self.backends.directory.delete_record(&ctx.imsi).await {
            Ok(()) => debug!(imsi = %ctx.imsi, "Directory record deleted"),
            Err(e) => warn!(imsi = %ctx.imsi, "Failed to delete directory record: {}", e),
        }
        Ok(())
    }

    /// Asks the RADIUS server to disconnect the client of a timed out session.
    pub(crate) async fn notify_radius_timeout(&self, ctx: &AaaContext) -> Result<()> {
        let radius = self.backends.registry.radius_notifier().map_err(|e| {
            Error::unavailable(format!(
                "session timeout notification RADIUS connection: {}",
                e
            ))
        })?;
        radius.disconnect(ctx).await
    }
}
