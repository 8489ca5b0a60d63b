//! Test application builder and request helpers

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

use sseudam_ar::broadcast::ResultBroadcaster;
use sseudam_ar::pipeline::{AnalysisPipeline, Collaborators};
use sseudam_ar::scoring::ScoringRules;
use sseudam_ar::services::{
    HardwareChannel, LiveChannel, RankingStore, SignedTokenVerifier, SqliteRankingStore,
    SqliteRecordStore,
};
use sseudam_ar::{build_router, AppState};
use sseudam_common::api::issue_token;
use sseudam_common::db::init::init_memory_database;
use sseudam_common::db::ranking::upsert_account;
use sseudam_common::db::RankAccount;
use sseudam_common::{GradeTable, TopicBus};

use super::fakes::RecordingDisplay;

/// Signing secret shared by the test app and issued tokens
pub const SECRET: &str = "integration-test-secret";

/// Router plus handles to everything a test may want to inspect
pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub bus: TopicBus,
    pub display: Arc<RecordingDisplay>,
}

impl TestApp {
    /// In-memory database, real adapters, recording display
    pub async fn new() -> Self {
        let pool = init_memory_database().await.expect("in-memory database");
        Self::with_pool(pool).await
    }

    pub async fn with_pool(pool: SqlitePool) -> Self {
        let bus = TopicBus::new(64);
        let display = Arc::new(RecordingDisplay::default());
        let router = Self::router_with(
            pool.clone(),
            Arc::new(SqliteRankingStore::new(pool.clone())),
            Arc::new(bus.clone()),
            bus.clone(),
            Some(display.clone()),
        );
        Self {
            router,
            pool,
            bus,
            display,
        }
    }

    /// Build a router with substituted ledger and channels
    pub fn router_with(
        pool: SqlitePool,
        ranking: Arc<dyn RankingStore>,
        live: Arc<dyn LiveChannel>,
        bus: TopicBus,
        hardware: Option<Arc<dyn HardwareChannel>>,
    ) -> Router {
        let broadcaster = ResultBroadcaster::new(live, hardware, Duration::from_millis(500));
        let pipeline = AnalysisPipeline::new(
            Collaborators {
                verifier: Arc::new(SignedTokenVerifier::new(SECRET)),
                ranking,
                records: Arc::new(SqliteRecordStore::new(pool)),
                grades: Arc::new(GradeTable::default()),
            },
            broadcaster,
            ScoringRules::default(),
        );
        build_router(AppState::new(pipeline, bus))
    }
}

/// `Authorization` header value for a user
pub fn bearer_for(user_id: &str) -> String {
    format!("Bearer {}", issue_token(user_id, 60_000, SECRET))
}

/// Create or replace a ledger row
pub async fn seed_account(pool: &SqlitePool, user_id: &str, accumulated_points: i64) {
    upsert_account(
        pool,
        &RankAccount {
            user_id: user_id.to_string(),
            group_id: Some(1),
            monthly_points: 0,
            accumulated_points,
        },
    )
    .await
    .expect("seed account");
}

/// POST a body to the analysis endpoint and decode the JSON response
pub async fn post_analysis(
    router: &Router,
    uri: &str,
    authorization: Option<&str>,
    body: &str,
) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(value) = authorization {
        request = request.header("authorization", value);
    }

    let response = router
        .clone()
        .oneshot(request.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Poll `condition` until it holds or one second passes
pub async fn wait_until<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
