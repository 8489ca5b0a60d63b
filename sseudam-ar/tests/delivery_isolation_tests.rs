//! Integration tests for failure isolation
//!
//! Delivery failures must not affect each other or the response. A ledger
//! write failure must stop the pipeline before anything is delivered.

mod helpers;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use helpers::{
    bearer_for, post_analysis, seed_account, wait_until, FailingLedger, FailingLive,
    RecordingDisplay, SlowLedger, TestApp,
};
use sseudam_ar::services::SqliteRankingStore;
use sseudam_common::db::analysis_results::list_records_for_user;
use sseudam_common::db::init::init_memory_database;
use sseudam_common::db::ranking::get_account;
use sseudam_common::TopicBus;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

const BODY: &str = r#"{"detection_results": [{"class": "PET_transparent", "confidence": 0.95}]}"#;

#[tokio::test]
async fn test_failing_display_does_not_block_live_delivery() {
    let pool = init_memory_database().await.unwrap();
    seed_account(&pool, "alice", 0).await;

    let bus = TopicBus::new(16);
    let mut live = bus.subscribe();
    let display = Arc::new(RecordingDisplay::failing());
    let router = TestApp::router_with(
        pool.clone(),
        Arc::new(SqliteRankingStore::new(pool.clone())),
        Arc::new(bus.clone()),
        bus,
        Some(display.clone()),
    );

    let (status, json) = post_analysis(&router, "/analysis-result", Some(&bearer_for("alice")), BODY).await;
    assert_eq!(status, StatusCode::OK);

    let msg = tokio::time::timeout(Duration::from_secs(1), live.recv())
        .await
        .expect("live delivery despite display failure")
        .unwrap();
    assert_eq!(msg.payload["successRate"], json["successRate"]);
    assert!(wait_until(|| display.sent() == vec![100]).await);
}

#[tokio::test]
async fn test_failing_live_channel_does_not_block_display() {
    let pool = init_memory_database().await.unwrap();
    seed_account(&pool, "bob", 0).await;

    let display = Arc::new(RecordingDisplay::default());
    let router = TestApp::router_with(
        pool.clone(),
        Arc::new(SqliteRankingStore::new(pool.clone())),
        Arc::new(FailingLive),
        TopicBus::new(16),
        Some(display.clone()),
    );

    let (status, json) = post_analysis(&router, "/analysis-result", Some(&bearer_for("bob")), BODY).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["accumulatedPoints"], 5);
    assert!(wait_until(|| display.sent() == vec![100]).await);
}

#[tokio::test]
async fn test_ledger_failure_returns_generic_error_and_skips_deliveries() {
    let pool = init_memory_database().await.unwrap();
    seed_account(&pool, "carol", 10).await;

    let bus = TopicBus::new(16);
    let mut live = bus.subscribe();
    let display = Arc::new(RecordingDisplay::default());
    let router = TestApp::router_with(
        pool.clone(),
        Arc::new(FailingLedger {
            inner: SqliteRankingStore::new(pool.clone()),
        }),
        Arc::new(bus.clone()),
        bus,
        Some(display.clone()),
    );

    let (status, json) = post_analysis(&router, "/analysis-result", Some(&bearer_for("carol")), BODY).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "Internal server error");
    assert!(json.get("details").is_none());
    assert!(!json.to_string().contains("sseudam.db"));

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(live.try_recv().is_err());
    assert!(display.sent().is_empty());

    let account = get_account(&pool, "carol").await.unwrap().unwrap();
    assert_eq!(account.accumulated_points, 10);

    // History is written before the ledger and is kept when the ledger fails
    let records = list_records_for_user(&pool, "carol", 10).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].record.prior_accumulated_points, 10);
}

#[tokio::test]
async fn test_without_display_configured() {
    let pool = init_memory_database().await.unwrap();
    seed_account(&pool, "dave", 0).await;

    let bus = TopicBus::new(16);
    let mut live = bus.subscribe();
    let router = TestApp::router_with(
        pool.clone(),
        Arc::new(SqliteRankingStore::new(pool.clone())),
        Arc::new(bus.clone()),
        bus,
        None,
    );

    let (status, _) = post_analysis(&router, "/analysis-result", Some(&bearer_for("dave")), BODY).await;
    assert_eq!(status, StatusCode::OK);
    assert!(tokio::time::timeout(Duration::from_secs(1), live.recv()).await.is_ok());
}

#[tokio::test]
async fn test_client_disconnect_still_completes_submission() {
    let pool = init_memory_database().await.unwrap();
    seed_account(&pool, "erin", 10).await;

    let bus = TopicBus::new(16);
    let mut live = bus.subscribe();
    let display = Arc::new(RecordingDisplay::default());
    let router = TestApp::router_with(
        pool.clone(),
        Arc::new(SlowLedger {
            inner: SqliteRankingStore::new(pool.clone()),
            delay: Duration::from_millis(200),
        }),
        Arc::new(bus.clone()),
        bus,
        Some(display.clone()),
    );

    let request = Request::builder()
        .method("POST")
        .uri("/analysis-result")
        .header("content-type", "application/json")
        .header("authorization", bearer_for("erin"))
        .body(Body::from(BODY))
        .unwrap();

    // Give up on the response while the ledger write is still in progress
    let abandoned = tokio::time::timeout(Duration::from_millis(50), router.oneshot(request)).await;
    assert!(abandoned.is_err());

    tokio::time::sleep(Duration::from_millis(500)).await;

    let account = get_account(&pool, "erin").await.unwrap().unwrap();
    assert_eq!(account.accumulated_points, 15);
    let records = list_records_for_user(&pool, "erin", 10).await.unwrap();
    assert_eq!(records.len(), 1);

    let msg = tokio::time::timeout(Duration::from_secs(1), live.recv())
        .await
        .expect("live delivery after disconnect")
        .unwrap();
    assert_eq!(msg.payload["accumulatedPoints"], 15);
    assert!(wait_until(|| display.sent() == vec![100]).await);
}
