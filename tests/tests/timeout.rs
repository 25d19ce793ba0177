//! Idle timeouts: timer arming, rearming, cancellation and the
//! timed-out session teardown.
//!
//! Timer tests run on a paused clock, so sleeps advance time instantly.

use std::time::Duration;

use aaa_core::{AaaConfig, ErrorCode};
use integration_tests::fixtures::{aaa_context, labels, start_request, stop_request, update_request};
use integration_tests::setup::{eventually, TestContext, TEST_IDLE_TIMEOUT};
use telemetry::{metrics, TerminationOutcome, TerminationSource};

async fn sleep_secs(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
}

#[tokio::test(start_paused = true)]
async fn test_idle_session_times_out() {
    let t = TestContext::new();
    let ctx = aaa_context();
    t.authenticate(&ctx);
    let (apn, imsi) = labels(&ctx);

    tokio::time::sleep(TEST_IDLE_TIMEOUT + Duration::from_secs(1)).await;
    assert!(eventually(|| t.events.event_count() == 1).await);

    assert!(!t.is_live(&ctx.session_id));
    assert_eq!(t.session_manager.ended(), vec![(imsi.clone(), apn.clone())]);
    assert_eq!(t.radius.disconnected(), vec![ctx.session_id.clone()]);
    assert_eq!(metrics().session_timeout.get(&apn, &imsi), 1);

    let events = t.events.events_from(TerminationSource::SessionTimeout);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].outcome, TerminationOutcome::Succeeded);
    assert_eq!(events[0].session_id, ctx.session_id);
}

#[tokio::test(start_paused = true)]
async fn test_session_survives_until_timeout() {
    let t = TestContext::new();
    let ctx = aaa_context();
    t.authenticate(&ctx);

    sleep_secs(59).await;
    tokio::task::yield_now().await;

    assert!(t.is_live(&ctx.session_id));
    assert_eq!(t.events.event_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_interim_update_defers_timeout() {
    let t = TestContext::new();
    let ctx = aaa_context();
    t.authenticate(&ctx);

    sleep_secs(40).await;
    t.service
        .interim_update(&update_request(&ctx, 1, 1))
        .await
        .unwrap();
    sleep_secs(40).await;
    tokio::task::yield_now().await;

    assert!(t.is_live(&ctx.session_id));

    sleep_secs(30).await;
    assert!(eventually(|| t.events.event_count() == 1).await);
    assert!(!t.is_live(&ctx.session_id));
    assert_eq!(t.radius.disconnect_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_start_rearms_timeout() {
    let t = TestContext::with_config(AaaConfig {
        create_session_on_auth: true,
        ..TestContext::default_config()
    });
    let ctx = aaa_context();
    t.authenticate(&ctx);

    sleep_secs(50).await;
    t.service.start(&start_request(&ctx)).await.unwrap();
    sleep_secs(50).await;
    tokio::task::yield_now().await;

    assert!(t.is_live(&ctx.session_id));

    sleep_secs(20).await;
    assert!(eventually(|| !t.is_live(&ctx.session_id)).await);
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_timeout() {
    let t = TestContext::new();
    let ctx = aaa_context();
    t.authenticate(&ctx);

    t.service.stop(&stop_request(&ctx)).await.unwrap();
    sleep_secs(120).await;
    tokio::task::yield_now().await;

    assert_eq!(t.events.event_count(), 1);
    assert_eq!(t.events.events()[0].source, TerminationSource::AccountingStop);
    assert_eq!(t.session_manager.end_count(), 1);
    assert_eq!(t.radius.disconnect_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stop_racing_timeout_tears_down_once() {
    let t = TestContext::new();
    let ctx = aaa_context();
    t.authenticate(&ctx);

    tokio::time::sleep(TEST_IDLE_TIMEOUT).await;
    t.service.stop(&stop_request(&ctx)).await.unwrap();

    assert!(eventually(|| t.events.event_count() >= 1).await);
    sleep_secs(5).await;

    assert_eq!(t.events.event_count(), 1);
    assert_eq!(t.session_manager.end_count(), 1);
    assert!(!t.is_live(&ctx.session_id));
}

#[tokio::test]
async fn test_timeout_without_context_is_invalid_argument() {
    let t = TestContext::new();

    let err = t.service.end_timed_out_session(None).await.unwrap_err();

    assert_eq!(err.code(), ErrorCode::InvalidArgument);
    assert_eq!(t.session_manager.end_count(), 0);
    assert_eq!(t.radius.disconnect_count(), 0);

    let events = t.events.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].source, TerminationSource::TimeoutNotification);
    assert_eq!(events[0].outcome, TerminationOutcome::Failed);
    assert!(events[0].session_id.is_empty());
}

#[tokio::test]
async fn test_timeout_radius_failure_is_unavailable() {
    let t = TestContext::new();
    let ctx = aaa_context();
    t.radius.set_should_fail(true);

    let err = t
        .service
        .end_timed_out_session(Some(&ctx))
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::Unavailable);
    assert_eq!(t.session_manager.end_count(), 1);

    let events = t.events.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].source, TerminationSource::SessionTimeout);
    assert_eq!(events[0].outcome, TerminationOutcome::Failed);
}

#[tokio::test]
async fn test_timeout_missing_radius_peer_is_unavailable() {
    let t = TestContext::new();
    let ctx = aaa_context();
    t.registry.set_unavailable(true);

    let err = t
        .service
        .end_timed_out_session(Some(&ctx))
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::Unavailable);
    assert_eq!(t.session_manager.end_count(), 1);
}

#[tokio::test]
async fn test_timeout_backend_failure_still_disconnects() {
    let t = TestContext::new();
    let ctx = aaa_context();
    t.session_manager.set_end_should_fail(true);

    let err = t
        .service
        .end_timed_out_session(Some(&ctx))
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::Unavailable);
    assert_eq!(t.radius.disconnect_count(), 1);
}

#[tokio::test]
async fn test_timeout_dual_failure_is_combined() {
    let t = TestContext::new();
    let ctx = aaa_context();
    let (apn, imsi) = labels(&ctx);
    t.session_manager.set_end_should_fail(true);
    t.radius.set_should_fail(true);

    let err = t
        .service
        .end_timed_out_session(Some(&ctx))
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::Internal);
    let message = err.to_string();
    assert!(message.contains("mock session manager end failure"));
    assert!(message.contains("mock RADIUS disconnect rejected"));
    assert_eq!(metrics().session_timeout.get(&apn, &imsi), 1);
    assert_eq!(t.events.event_count(), 1);
}

#[tokio::test]
async fn test_timeout_dual_failure_without_radius_peer_is_combined() {
    let t = TestContext::new();
    let ctx = aaa_context();
    t.session_manager.set_end_should_fail(true);
    t.registry.set_unavailable(true);

    let err = t
        .service
        .end_timed_out_session(Some(&ctx))
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::Internal);
    let message = err.to_string();
    assert!(message.contains("mock session manager end failure"));
    assert!(message.contains("RADIUS connection"));
    assert_eq!(t.radius.disconnect_count(), 0);
    assert_eq!(t.events.event_count(), 1);
}

#[tokio::test]
async fn test_timeout_without_accounting_deletes_directory_record() {
    let t = TestContext::with_config(AaaConfig {
        accounting_enabled: false,
        ..TestContext::default_config()
    });
    let ctx = aaa_context();

    t.service.end_timed_out_session(Some(&ctx)).await.unwrap();

    assert_eq!(t.session_manager.end_count(), 0);
    assert_eq!(t.directory.deleted(), vec![ctx.imsi.clone()]);
    assert_eq!(t.radius.disconnect_count(), 1);
}
