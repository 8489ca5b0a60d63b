//! Analysis result pipeline
//!
//! One submission flows through: authenticate, parse, score and aggregate,
//! lock the user, read the ledger, cap the deduction, record history, apply
//! the delta, detect a grade change, then hand the outcome to the
//! broadcaster. Client-caused failures are raised before anything is written.

pub mod grade_transition;
pub mod locks;
pub mod request;

pub use grade_transition::{GradeTransition, PROMOTION_MESSAGE};
pub use locks::UserLocks;
pub use request::parse_detections;

use serde::Serialize;
use serde_json::json;
use sseudam_common::api::parse_bearer;
use sseudam_common::db::AnalysisRecord;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::broadcast::{DeliveryHandles, ResultBroadcaster};
use crate::error::{AnalysisError, AnalysisResult, AuthFailure};
use crate::scoring::{self, DetectedObject, ScoringRules};
use crate::services::{AnalysisRecordStore, GradeFunction, RankingStore, TokenVerifier};

/// Outcome returned to the caller and published to the live channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomePayload {
    pub total_detected_objects: usize,
    pub correctly_classified_objects: usize,
    pub incorrectly_classified_objects: usize,
    pub earned_points: i64,
    /// Deduction after capping
    pub deducted_points: i64,
    /// `earned - deducted`; may be negative
    pub final_points: i64,
    pub monthly_points: i64,
    pub accumulated_points: i64,
    pub success_rate: i64,
    pub grade: String,
    /// Empty when the grade did not change
    pub promotion_message: String,
}

/// A processed submission and its in-flight deliveries
pub struct Processed {
    pub payload: OutcomePayload,
    pub deliveries: DeliveryHandles,
}

/// Collaborators wired into the pipeline
#[derive(Clone)]
pub struct Collaborators {
    pub verifier: Arc<dyn TokenVerifier>,
    pub ranking: Arc<dyn RankingStore>,
    pub records: Arc<dyn AnalysisRecordStore>,
    pub grades: Arc<dyn GradeFunction>,
}

pub struct AnalysisPipeline {
    collaborators: Collaborators,
    broadcaster: ResultBroadcaster,
    rules: ScoringRules,
    locks: UserLocks,
}

impl AnalysisPipeline {
    pub fn new(collaborators: Collaborators, broadcaster: ResultBroadcaster, rules: ScoringRules) -> Self {
        Self {
            collaborators,
            broadcaster,
            rules,
            locks: UserLocks::new(),
        }
    }

    /// Full request path: Authorization header value plus raw JSON body
    ///
    /// Authentication and parsing run on the caller's task. Everything after
    /// runs on a spawned task, so a dropped caller cannot stop it halfway
    /// and a panic surfaces as an internal error.
    pub async fn handle(
        self: &Arc<Self>,
        authorization: Option<&str>,
        body: &[u8],
    ) -> AnalysisResult<Processed> {
        let user_id = self.authenticate(authorization).await?;
        let objects = parse_detections(body)?;

        let pipeline = Arc::clone(self);
        let task_user = user_id.clone();
        let task = tokio::spawn(async move { pipeline.process(&task_user, &objects).await });

        match task.await {
            Ok(result) => result,
            Err(e) => {
                error!(user_id = %user_id, "Analysis task failed: {}", e);
                Err(AnalysisError::Internal(format!("analysis task failed: {}", e)))
            }
        }
    }

    /// Resolve the `Authorization` header to a user id
    pub async fn authenticate(&self, authorization: Option<&str>) -> AnalysisResult<String> {
        let header = authorization.ok_or(AuthFailure::MissingHeader)?;
        let token = parse_bearer(header).ok_or(AuthFailure::MalformedHeader)?;
        let user_id = self.collaborators.verifier.verify(token).await?;
        Ok(user_id)
    }

    /// Score, update the ledger and dispatch deliveries for an authenticated user
    pub async fn process(&self, user_id: &str, objects: &[DetectedObject]) -> AnalysisResult<Processed> {
        let totals = scoring::aggregate(objects, &self.rules)?;
        let success_rate = scoring::success_rate(totals.correct, totals.total);

        let payload = {
            let _guard = self.locks.acquire(user_id).await;

            let account = self
                .collaborators
                .ranking
                .get(user_id)
                .await
                .map_err(|e| internal("ranking lookup failed", user_id, e))?
                .ok_or_else(|| AnalysisError::UserNotFound(user_id.to_string()))?;

            let prior_points = account.accumulated_points;
            let deducted = scoring::cap_deduction(totals.deducted, prior_points);
            let final_points = totals.earned - deducted;
            debug!(
                user_id,
                raw_deducted = totals.deducted,
                deducted,
                final_points,
                "Scored submission"
            );

            let record = AnalysisRecord {
                user_id: user_id.to_string(),
                prior_accumulated_points: prior_points,
                success_rate,
                earned: totals.earned,
                deducted,
                material: self.rules.target_category.clone(),
                group_id: account.group_id,
                detected_objects: detected_objects_json(objects),
                created_at: sseudam_common::time::now(),
            };
            if let Err(e) = self.collaborators.records.save(&record).await {
                warn!(user_id, "Failed to store analysis record: {}", e);
            }

            let updated = self
                .collaborators
                .ranking
                .apply_delta(user_id, final_points)
                .await
                .map_err(|e| internal("ledger update failed", user_id, e))?;

            let transition = GradeTransition::detect(
                self.collaborators.grades.as_ref(),
                prior_points,
                updated.accumulated_points,
            );
            if transition.changed() {
                info!(
                    user_id,
                    from = %transition.previous,
                    to = %transition.current,
                    "Grade changed"
                );
            }

            OutcomePayload {
                total_detected_objects: totals.total,
                correctly_classified_objects: totals.correct,
                incorrectly_classified_objects: totals.incorrect,
                earned_points: totals.earned,
                deducted_points: deducted,
                final_points,
                monthly_points: updated.monthly_points,
                accumulated_points: updated.accumulated_points,
                success_rate,
                grade: transition.current.clone(),
                promotion_message: transition.notice().to_string(),
            }
        };

        info!(
            user_id,
            success_rate,
            final_points = payload.final_points,
            accumulated_points = payload.accumulated_points,
            "Analysis result applied"
        );

        let deliveries = match serde_json::to_value(&payload) {
            Ok(value) => self.broadcaster.dispatch(value, success_rate),
            Err(e) => {
                // Ledger is already updated; still notify the display
                error!(user_id, "Failed to serialize outcome payload: {}", e);
                self.broadcaster.dispatch(json!({}), success_rate)
            }
        };

        Ok(Processed { payload, deliveries })
    }
}

fn internal(context: &str, user_id: &str, err: sseudam_common::Error) -> AnalysisError {
    error!(user_id, "{}: {}", context, err);
    AnalysisError::Internal(format!("{}: {}", context, err))
}

fn detected_objects_json(objects: &[DetectedObject]) -> serde_json::Value {
    serde_json::Value::Array(
        objects
            .iter()
            .map(|o| json!({"class": o.class, "confidence": o.confidence}))
            .collect(),
    )
}
