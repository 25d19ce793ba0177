//! RADIUS accounting, termination, timeout and recovery handlers.

use aaa_core::{
    decorate_imsi, same_subscriber, AaaContext,
    AcctResponse, AddSessionsRequest, Error, Result, StartRequest, StopRequest,
    TerminateSessionRequest, UpdateRequest,
};
use telemetry::{metrics, TerminationSource};
use tracing::{debug, info, warn};
use validator::Validate;

use crate::{AccountingService, TeardownErrors};

/// RADIUS accounting requests only need to name their session.
fn session_context<'a>(ctx: Option<&'a AaaContext>, what: &str) -> Result<&'a AaaContext> {
    match ctx {
        Some(ctx) if !ctx.session_id.is_empty() => Ok(ctx),
        Some(_) => Err(Error::invalid_argument(format!("{} has no session id", what))),
        None => Err(Error::invalid_argument(format!("nil {}", what))),
    }
}

impl AccountingService {
    /// Acct-Status-Type Start.
    ///
    /// Opens the backend accounting session unless that already happened at
    /// authentication time, in which case only the idle timer is rearmed.
    pub async fn start(&self, req: &StartRequest) -> Result<AcctResponse> {
        let ctx = session_context(req.ctx.as_ref(), "start context")?;
        let session = self.sessions.get_session(&ctx.session_id).ok_or_else(|| {
            Error::failed_precondition(format!(
                "accounting start: session {} is not authenticated",
                ctx.session_id
            ))
        })?;
        metrics().acct_start.inc();

        if self.config.accounting_enabled && !self.config.create_session_on_auth {
            let created = self.create_session(ctx).await?;
            session.lock().acct_session_id = created.session_id;
        } else {
            self.sessions
                .set_timeout(&ctx.session_id, self.session_timeout, self.notifier.clone());
        }

        info!(session_id = %ctx.session_id, "Accounting start");
        Ok(AcctResponse::default())
    }

    /// Acct-Status-Type Interim-Update: rearms the idle timer and records
    /// traffic counters.
    pub async fn interim_update(&self, req: &UpdateRequest) -> Result<AcctResponse> {
        let ctx = session_context(req.ctx.as_ref(), "update context")?;
        let session = self.sessions.get_session(&ctx.session_id).ok_or_else(|| {
            Error::failed_precondition(format!(
                "accounting update: session {} is not found",
                ctx.session_id
            ))
        })?;

        self.sessions
            .set_timeout(&ctx.session_id, self.session_timeout, self.notifier.clone());

        let (apn, imsi) = {
            let stored = session.lock();
            (stored.apn.clone(), decorate_imsi(&stored.imsi))
        };
        let m = metrics();
        m.interim_updates.inc();
        m.octets_in.inc_by(&apn, &imsi, req.octets_in);
        m.octets_out.inc_by(&apn, &imsi, req.octets_out);

        debug!(
            session_id = %ctx.session_id,
            octets_in = req.octets_in,
            octets_out = req.octets_out,
            "Accounting interim update"
        );
        Ok(AcctResponse::default())
    }

    /// Acct-Status-Type Stop.
    ///
    /// A session that is already gone is acknowledged without side effects.
    pub async fn stop(&self, req: &StopRequest) -> Result<AcctResponse> {
        let ctx = session_context(req.ctx.as_ref(), "stop context")?;
        let Some(session) = self.sessions.remove_session(&ctx.session_id) else {
            warn!(session_id = %ctx.session_id, "Accounting stop for unknown session");
            return Ok(AcctResponse::default());
        };

        let stored = session.snapshot();
        let result = self.teardown_backend(&stored).await;
        metrics()
            .acct_stop
            .inc(&stored.apn, &decorate_imsi(&stored.imsi));
        self.log_termination(
            TerminationSource::AccountingStop,
            Some(&stored),
            result.as_ref().err(),
        );

        info!(
            session_id = %stored.session_id,
            cause = req.cause.as_deref().unwrap_or("unspecified"),
            "Accounting stop"
        );
        result.map(|()| AcctResponse::default())
    }

    /// Session manager notification that it has ended a session.
    ///
    /// Removes the session and asks the RADIUS server to disconnect the
    /// client.
    pub async fn terminate_session(&self, req: &TerminateSessionRequest) -> Result<AcctResponse> {
        req.validate()?;

        let session = self
            .sessions
            .remove_session(&req.radius_session_id)
            .ok_or_else(|| {
                Error::failed_precondition(format!(
                    "session {} is not found",
                    req.radius_session_id
                ))
            })?;

        let stored = session.snapshot();
        metrics()
            .session_terminate
            .inc(&stored.apn, &decorate_imsi(&stored.imsi));

        let result = self.disconnect_terminated(&stored, req).await;
        self.log_termination(
            TerminationSource::SessionTerminate,
            Some(&stored),
            result.as_ref().err(),
        );

        info!(session_id = %stored.session_id, "Session terminated");
        result.map(|()| AcctResponse::default())
    }

    async fn disconnect_terminated(
        &self,
        stored: &AaaContext,
        req: &TerminateSessionRequest,
    ) -> Result<()> {
        if !same_subscriber(&stored.imsi, &req.imsi) {
            return Err(Error::invalid_argument(format!(
                "mismatched IMSI: {} != {} of session {}",
                req.imsi,
                decorate_imsi(&stored.imsi),
                stored.session_id
            )));
        }

        let radius = self.backends.registry.radius_notifier().map_err(|e| {
            Error::unavailable(format!("RADIUS connection: {}", e))
        })?;
        radius
            .disconnect(stored)
            .await
            .map_err(|e| Error::internal(format!("RADIUS disconnect: {}", e)))
    }

    /// Finalizes a session whose idle timer fired.
    ///
    /// The session has already left the table; this ends its backend state
    /// and has the RADIUS server disconnect the client, attempting both
    /// even if the first fails.
    pub async fn end_timed_out_session(&self, ctx: Option<&AaaContext>) -> Result<()> {
        let Some(ctx) = ctx else {
            let err = Error::invalid_argument("nil AAA context");
            self.log_termination(TerminationSource::TimeoutNotification, None, Some(&err));
            return Err(err);
        };

        let mut errors = TeardownErrors::default();
        if let Err(e) = self.teardown_backend(ctx).await {
            errors.backend = Some(e);
        }
        metrics()
            .session_timeout
            .inc(&ctx.apn, &decorate_imsi(&ctx.imsi));
        if let Err(e) = self.notify_radius_timeout(ctx).await {
            errors.radius = Some(e);
        }

        let result = errors.into_result();
        self.log_termination(
            TerminationSource::SessionTimeout,
            Some(ctx),
            result.as_ref().err(),
        );

        info!(session_id = %ctx.session_id, "Idle session timed out");
        result
    }

    /// Bulk-inserts sessions the session manager still holds, replacing
    /// any live session of the same subscriber.
    ///
    /// Every valid entry is committed; the IMSIs of the rest are reported
    /// together.
    pub fn add_sessions(&self, req: &AddSessionsRequest) -> Result<AcctResponse> {
        let mut failed = Vec::new();

        for ctx in &req.sessions {
            let mut ctx = ctx.clone();
            ctx.imsi = ctx.bare_imsi().to_string();
            let imsi = ctx.imsi.clone();

            match self
                .sessions
                .add_session(ctx, self.session_timeout, self.notifier.clone(), true)
            {
                Ok(_) => metrics().sessions_recovered.inc(),
                Err(e) => {
                    warn!(imsi = %imsi, "Unable to add recovered session: {}", e);
                    metrics().sessions_recovery_failed.inc();
                    failed.push(imsi);
                }
            }
        }

        info!(
            requested = req.sessions.len(),
            failed = failed.len(),
            "Recovered sessions"
        );
        if failed.is_empty() {
            Ok(AcctResponse::default())
        } else {
            Err(Error::SessionsNotAdded(failed))
        }
    }
}
