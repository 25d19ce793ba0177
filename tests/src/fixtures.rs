//! Test fixtures with unique subscriber identities.
//!
//! Metrics are process-global, so every fixture gets its own IMSI and APN
//! and tests assert on their own labels only.

use std::sync::atomic::{AtomicU64, Ordering};

use aaa_core::{
    decorate_imsi, AaaContext, StartRequest, StopRequest, TerminateSessionRequest, UpdateRequest,
};
use uuid::Uuid;

static NEXT_SUBSCRIBER: AtomicU64 = AtomicU64::new(1);

/// A fresh 15-digit bare IMSI.
pub fn unique_imsi() -> String {
    let n = NEXT_SUBSCRIBER.fetch_add(1, Ordering::Relaxed);
    format!("00101{:010}", n)
}

/// An authenticated client context with unique identity fields.
pub fn aaa_context() -> AaaContext {
    let imsi = unique_imsi();
    AaaContext {
        session_id: format!("sess-{}", Uuid::new_v4()),
        apn: format!("apn-{}", &imsi[5..]),
        identity: format!("1{}@wlan.mnc001.mcc001.3gppnetwork.org", imsi),
        msisdn: format!("1555{}", &imsi[8..]),
        mac_addr: "02-00-5E-10-00-01".to_string(),
        ip_addr: "10.20.0.7".to_string(),
        imsi,
        acct_session_id: String::new(),
    }
}

/// Context of a session that already holds a backend accounting session.
pub fn accounted_context() -> AaaContext {
    AaaContext {
        acct_session_id: format!("acct-{}", Uuid::new_v4()),
        ..aaa_context()
    }
}

/// `(apn, decorated imsi)` metric labels of a context.
pub fn labels(ctx: &AaaContext) -> (String, String) {
    (ctx.apn.clone(), decorate_imsi(&ctx.imsi))
}

pub fn start_request(ctx: &AaaContext) -> StartRequest {
    StartRequest {
        ctx: Some(ctx.clone()),
    }
}

pub fn update_request(ctx: &AaaContext, octets_in: u64, octets_out: u64) -> UpdateRequest {
    UpdateRequest {
        ctx: Some(ctx.clone()),
        octets_in,
        octets_out,
        packets_in: octets_in / 1000,
        packets_out: octets_out / 1000,
    }
}

pub fn stop_request(ctx: &AaaContext) -> StopRequest {
    StopRequest {
        ctx: Some(ctx.clone()),
        cause: Some("User-Request".to_string()),
    }
}

/// Termination request naming the session's subscriber in canonical form.
pub fn terminate_request(ctx: &AaaContext) -> TerminateSessionRequest {
    TerminateSessionRequest {
        radius_session_id: ctx.session_id.clone(),
        imsi: decorate_imsi(&ctx.imsi),
    }
}
