//! Collaborator seams used by the analysis pipeline
//!
//! The pipeline depends only on these traits. Each has one production
//! adapter in this module tree; tests substitute fakes.

pub mod display_client;
pub mod live_channel;
pub mod ranking_store;
pub mod record_store;
pub mod token_verifier;

pub use display_client::DisplayClient;
pub use ranking_store::SqliteRankingStore;
pub use record_store::SqliteRecordStore;
pub use token_verifier::SignedTokenVerifier;

use async_trait::async_trait;
use sseudam_common::db::{AnalysisRecord, RankAccount};
use sseudam_common::GradeTable;

use crate::error::{AuthFailure, DeliveryError};

/// Resolves a bearer token to a user id
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<String, AuthFailure>;
}

/// Ranking ledger
#[async_trait]
pub trait RankingStore: Send + Sync {
    async fn get(&self, user_id: &str) -> sseudam_common::Result<Option<RankAccount>>;

    /// Apply a signed delta and return the refreshed account
    async fn apply_delta(&self, user_id: &str, delta: i64) -> sseudam_common::Result<RankAccount>;
}

/// Append-only history of inspection events
#[async_trait]
pub trait AnalysisRecordStore: Send + Sync {
    async fn save(&self, record: &AnalysisRecord) -> sseudam_common::Result<i64>;
}

/// Maps accumulated points to a tier label; pure and total
pub trait GradeFunction: Send + Sync {
    fn grade_of(&self, accumulated_points: i64) -> String;
}

impl GradeFunction for GradeTable {
    fn grade_of(&self, accumulated_points: i64) -> String {
        GradeTable::grade_of(self, accumulated_points).to_string()
    }
}

/// Pub/sub transport to user clients
#[async_trait]
pub trait LiveChannel: Send + Sync {
    async fn publish(&self, topic: &str, payload: serde_json::Value) -> Result<(), DeliveryError>;
}

/// Transport to the physical display device
#[async_trait]
pub trait HardwareChannel: Send + Sync {
    async fn send(&self, success_rate: i64) -> Result<(), DeliveryError>;
}
