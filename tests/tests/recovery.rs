//! Bulk session recovery and authenticated session insertion.

use std::time::Duration;

use aaa_core::{decorate_imsi, AaaConfig, AaaContext, AddSessionsRequest, Error, ErrorCode};
use integration_tests::fixtures::{aaa_context, accounted_context};
use integration_tests::setup::{eventually, TestContext, TEST_IDLE_TIMEOUT};
use telemetry::{metrics, TerminationSource};

fn prefixed(ctx: &AaaContext) -> AaaContext {
    AaaContext {
        imsi: decorate_imsi(&ctx.imsi),
        ..ctx.clone()
    }
}

#[tokio::test]
async fn test_add_sessions_stores_bare_imsi() {
    let t = TestContext::new();
    let ctx = accounted_context();

    t.service
        .add_sessions(&AddSessionsRequest {
            sessions: vec![prefixed(&ctx)],
        })
        .unwrap();

    let session = t.service.sessions().get_session(&ctx.session_id).unwrap();
    assert_eq!(session.lock().imsi, ctx.imsi);
    assert_eq!(session.lock().acct_session_id, ctx.acct_session_id);
    assert!(t.service.sessions().get_session_by_imsi(&ctx.imsi).is_some());
    assert!(t
        .service
        .sessions()
        .get_session_by_imsi(&decorate_imsi(&ctx.imsi))
        .is_some());
}

#[tokio::test]
async fn test_add_sessions_replaces_live_session_of_subscriber() {
    let t = TestContext::new();
    let live = aaa_context();
    t.authenticate(&live);

    let recovered = AaaContext {
        session_id: format!("{}-recovered", live.session_id),
        ..accounted_context()
    };
    let recovered = AaaContext {
        imsi: live.imsi.clone(),
        ..recovered
    };
    t.service
        .add_sessions(&AddSessionsRequest {
            sessions: vec![recovered.clone()],
        })
        .unwrap();

    assert!(!t.is_live(&live.session_id));
    let by_imsi = t.service.sessions().get_session_by_imsi(&live.imsi).unwrap();
    assert_eq!(by_imsi.session_id(), recovered.session_id);
    // Replacement is silent: nothing was torn down
    assert_eq!(t.events.event_count(), 0);
    assert_eq!(t.session_manager.end_count(), 0);
}

#[tokio::test]
async fn test_add_sessions_reports_failed_imsis() {
    let t = TestContext::new();
    let first = aaa_context();
    let broken = AaaContext {
        session_id: String::new(),
        ..aaa_context()
    };
    let last = aaa_context();
    let failed_before = metrics().sessions_recovery_failed.get();

    let err = t
        .service
        .add_sessions(&AddSessionsRequest {
            sessions: vec![first.clone(), prefixed(&broken), last.clone()],
        })
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::Internal);
    match &err {
        Error::SessionsNotAdded(imsis) => assert_eq!(imsis, &vec![broken.imsi.clone()]),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains(&broken.imsi));
    assert!(t.is_live(&first.session_id));
    assert!(t.is_live(&last.session_id));
    assert!(t.service.sessions().get_session_by_imsi(&broken.imsi).is_none());
    assert!(metrics().sessions_recovery_failed.get() > failed_before);
}

#[tokio::test]
async fn test_add_sessions_empty_batch_is_ok() {
    let t = TestContext::new();

    t.service.add_sessions(&AddSessionsRequest::default()).unwrap();

    assert!(t.service.sessions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_recovered_sessions_time_out() {
    let t = TestContext::new();
    let ctx = accounted_context();

    t.service
        .add_sessions(&AddSessionsRequest {
            sessions: vec![ctx.clone()],
        })
        .unwrap();
    tokio::time::sleep(TEST_IDLE_TIMEOUT + Duration::from_secs(1)).await;

    assert!(eventually(|| t.events.event_count() == 1).await);
    assert_eq!(t.events.events()[0].source, TerminationSource::SessionTimeout);
    assert_eq!(t.radius.disconnected(), vec![ctx.session_id.clone()]);
}

#[tokio::test(start_paused = true)]
async fn test_recovered_session_timeout_deletes_stored_directory_record() {
    let t = TestContext::with_config(AaaConfig {
        accounting_enabled: false,
        ..TestContext::default_config()
    });
    let ctx = aaa_context();

    t.service
        .add_sessions(&AddSessionsRequest {
            sessions: vec![prefixed(&ctx)],
        })
        .unwrap();
    tokio::time::sleep(TEST_IDLE_TIMEOUT + Duration::from_secs(1)).await;

    assert!(eventually(|| t.events.event_count() == 1).await);
    assert_eq!(t.directory.deleted(), vec![ctx.imsi.clone()]);
    assert_eq!(t.session_manager.end_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_replaced_session_timer_never_fires() {
    let t = TestContext::new();
    let live = aaa_context();
    t.authenticate(&live);

    tokio::time::sleep(Duration::from_secs(30)).await;
    let recovered = AaaContext {
        session_id: format!("{}-recovered", live.session_id),
        ..live.clone()
    };
    t.service
        .add_sessions(&AddSessionsRequest {
            sessions: vec![recovered.clone()],
        })
        .unwrap();

    // Past the replaced session's deadline, before the recovered one's
    tokio::time::sleep(Duration::from_secs(40)).await;
    tokio::task::yield_now().await;
    assert_eq!(t.events.event_count(), 0);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(eventually(|| t.events.event_count() == 1).await);
    assert_eq!(t.events.events()[0].session_id, recovered.session_id);
}

#[tokio::test]
async fn test_authenticated_duplicate_subscriber_already_exists() {
    let t = TestContext::new();
    let ctx = aaa_context();
    t.authenticate(&ctx);

    let second = AaaContext {
        session_id: format!("{}-second", ctx.session_id),
        ..ctx.clone()
    };
    let err = t.service.add_authenticated_session(second).unwrap_err();

    assert_eq!(err.code(), ErrorCode::AlreadyExists);
    assert_eq!(t.service.sessions().len(), 1);
}

#[tokio::test]
async fn test_authenticated_session_requires_identity() {
    let t = TestContext::new();
    let ctx = AaaContext {
        imsi: String::new(),
        ..aaa_context()
    };

    let err = t.service.add_authenticated_session(ctx).unwrap_err();

    assert_eq!(err.code(), ErrorCode::InvalidArgument);
}
