//! Analysis history database operations
//!
//! Rows are append-only: one per inspection event.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use super::models::{AnalysisRecord, StoredAnalysisRecord};
use crate::{Error, Result};

/// Insert an analysis record and return its row id
pub async fn save_record(pool: &SqlitePool, record: &AnalysisRecord) -> Result<i64> {
    // Prepare all data BEFORE acquiring database connection
    let detected_objects_json = serde_json::to_string(&record.detected_objects)
        .map_err(|e| Error::Internal(format!("Failed to serialize detected objects: {}", e)))?;
    let month = record.month();
    let created_at = record.created_at.to_rfc3339();

    let result = sqlx::query(
        r#"
        INSERT INTO analysis_results (
            user_id, prior_accumulated_points, success_percent, earned, deducted,
            material, group_id, detected_objects_json, month, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.user_id)
    .bind(record.prior_accumulated_points)
    .bind(record.success_rate)
    .bind(record.earned)
    .bind(record.deducted)
    .bind(&record.material)
    .bind(record.group_id)
    .bind(&detected_objects_json)
    .bind(&month)
    .bind(&created_at)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Most recent records for a user, newest first
pub async fn list_records_for_user(
    pool: &SqlitePool,
    user_id: &str,
    limit: i64,
) -> Result<Vec<StoredAnalysisRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT id, user_id, prior_accumulated_points, success_percent, earned, deducted,
               material, group_id, detected_objects_json, month, created_at
        FROM analysis_results
        WHERE user_id = ?
        ORDER BY id DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| {
            let detected: String = row.get("detected_objects_json");
            let detected_objects = serde_json::from_str(&detected).map_err(|e| {
                Error::Internal(format!("Failed to deserialize detected objects: {}", e))
            })?;

            let created_at: String = row.get("created_at");
            let created_at = DateTime::parse_from_rfc3339(&created_at)
                .map_err(|e| Error::Internal(format!("Failed to parse created_at: {}", e)))?
                .with_timezone(&Utc);

            let material: Option<String> = row.get("material");

            Ok(StoredAnalysisRecord {
                id: row.get("id"),
                month: row.get("month"),
                record: AnalysisRecord {
                    user_id: row.get("user_id"),
                    prior_accumulated_points: row.get("prior_accumulated_points"),
                    success_rate: row.get("success_percent"),
                    earned: row.get("earned"),
                    deducted: row.get("deducted"),
                    material: material.unwrap_or_default(),
                    group_id: row.get("group_id"),
                    detected_objects,
                    created_at,
                },
            })
        })
        .collect()
}
