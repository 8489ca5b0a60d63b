//! sseudam-ar library interface
//!
//! Scores object-detection results for one waste item, updates the user's
//! ranking ledger and fans the outcome out to live clients and the display
//! device. Exposes the router and state for integration testing.

pub mod api;
pub mod broadcast;
pub mod error;
pub mod pipeline;
pub mod scoring;
pub mod services;

pub use crate::error::{AnalysisError, AnalysisResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sseudam_common::config::TomlConfig;
use sseudam_common::Error;
use sseudam_common::TopicBus;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::broadcast::ResultBroadcaster;
use crate::pipeline::{AnalysisPipeline, Collaborators};
use crate::scoring::ScoringRules;
use crate::services::{
    DisplayClient, HardwareChannel, SignedTokenVerifier, SqliteRankingStore, SqliteRecordStore,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AnalysisPipeline>,
    /// Live channel; SSE clients subscribe here
    pub event_bus: TopicBus,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(pipeline: AnalysisPipeline, event_bus: TopicBus) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            event_bus,
            startup_time: Utc::now(),
        }
    }

    /// Wire the SQLite, signed-token, topic-bus and display adapters
    ///
    /// An empty `delivery.display_url` disables hardware delivery. Grade
    /// tiers come from `[[grades]]` when configured.
    pub fn from_config(
        db: SqlitePool,
        signing_secret: &str,
        config: &TomlConfig,
    ) -> sseudam_common::Result<Self> {
        let event_bus = TopicBus::new(config.delivery.event_capacity);

        let hardware: Option<Arc<dyn HardwareChannel>> = if config.delivery.display_url.is_empty() {
            None
        } else {
            let client = DisplayClient::new(
                config.delivery.display_url.clone(),
                config.delivery.display_timeout_ms,
            )
            .map_err(|e| Error::Config(format!("display client: {}", e)))?;
            Some(Arc::new(client))
        };

        let broadcaster = ResultBroadcaster::new(
            Arc::new(event_bus.clone()),
            hardware,
            Duration::from_millis(config.delivery.delivery_timeout_ms),
        );

        let collaborators = Collaborators {
            verifier: Arc::new(SignedTokenVerifier::new(signing_secret)),
            ranking: Arc::new(SqliteRankingStore::new(db.clone())),
            records: Arc::new(SqliteRecordStore::new(db)),
            grades: Arc::new(config.grade_table()?),
        };

        let pipeline = AnalysisPipeline::new(
            collaborators,
            broadcaster,
            ScoringRules::from_config(&config.scoring),
        );

        Ok(Self::new(pipeline, event_bus))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::analysis_routes())
        .merge(api::camera_routes())
        .merge(api::event_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
