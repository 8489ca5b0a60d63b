//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-user ranking ledger row
///
/// `accumulated_points` is the all-time balance and never goes below zero.
/// `monthly_points` is the current period counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankAccount {
    pub user_id: String,
    pub group_id: Option<i64>,
    pub monthly_points: i64,
    pub accumulated_points: i64,
}

/// One inspection event, written once and never updated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub user_id: String,
    /// Accumulated points observed before this event's ledger update
    pub prior_accumulated_points: i64,
    /// 0..=100
    pub success_rate: i64,
    pub earned: i64,
    pub deducted: i64,
    pub material: String,
    pub group_id: Option<i64>,
    /// Detected objects as submitted (JSON array)
    pub detected_objects: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    /// `YYYYMM` bucket of `created_at`
    pub fn month(&self) -> String {
        crate::time::month_key(&self.created_at)
    }
}

/// Analysis record as read back from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAnalysisRecord {
    pub id: i64,
    pub month: String,
    #[serde(flatten)]
    pub record: AnalysisRecord,
}
