//! Database initialization
//!
//! Opens (or creates) the SQLite database and creates the tables used by the
//! SSEUDAM services. Every statement is idempotent, so this runs on each start.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Default busy timeout before SQLite reports `database is locked`
const BUSY_TIMEOUT_MS: u32 = 250;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    let pragma_sql = format!("PRAGMA busy_timeout = {}", BUSY_TIMEOUT_MS);
    sqlx::query(&pragma_sql).execute(&pool).await?;

    create_tables(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory database with the full schema
///
/// An in-memory SQLite database lives inside one connection, so the pool is
/// capped at one connection that is never recycled.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    create_tables(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent)
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_settings_table(pool).await?;
    create_rank_accounts_table(pool).await?;
    create_analysis_results_table(pool).await?;
    Ok(())
}

/// Create the settings table
///
/// Stores application configuration key-value pairs.
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the ranking ledger table
///
/// `accumulated_points` carries a CHECK constraint so no writer can push it
/// below zero; `monthly_points` is a period counter and may go negative.
pub async fn create_rank_accounts_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rank_accounts (
            user_id TEXT PRIMARY KEY,
            group_id INTEGER,
            monthly_points INTEGER NOT NULL DEFAULT 0,
            accumulated_points INTEGER NOT NULL DEFAULT 0 CHECK (accumulated_points >= 0),
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_rank_accounts_group ON rank_accounts(group_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the analysis history table
pub async fn create_analysis_results_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS analysis_results (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            prior_accumulated_points INTEGER NOT NULL,
            success_percent INTEGER NOT NULL CHECK (success_percent BETWEEN 0 AND 100),
            earned INTEGER NOT NULL,
            deducted INTEGER NOT NULL,
            material TEXT,
            group_id INTEGER,
            detected_objects_json TEXT NOT NULL DEFAULT '[]',
            month TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_analysis_results_user ON analysis_results(user_id, created_at)",
    )
    .execute(pool)
    .await?;

    info!("Database tables initialized (settings, rank_accounts, analysis_results)");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_tables_is_idempotent() {
        let pool = init_memory_database().await.unwrap();
        create_tables(&pool).await.unwrap();
        create_tables(&pool).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        let names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();
        assert_eq!(names, vec!["analysis_results", "rank_accounts", "settings"]);
    }

    #[tokio::test]
    async fn test_negative_accumulated_rejected_by_schema() {
        let pool = init_memory_database().await.unwrap();

        let result = sqlx::query(
            "INSERT INTO rank_accounts (user_id, accumulated_points, updated_at) VALUES ('u', -1, '')",
        )
        .execute(&pool)
        .await;

        assert!(result.is_err(), "CHECK constraint must reject negative balance");
    }
}
