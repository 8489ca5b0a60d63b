//! Ranking ledger database operations
//!
//! The ledger is keyed by user id. [`apply_delta`] is the only statement that
//! changes point balances.

use sqlx::SqlitePool;

use super::models::RankAccount;
use super::retry::retry_on_lock;
use crate::{Error, Result};

type AccountRow = (String, Option<i64>, i64, i64);

fn to_account(row: AccountRow) -> RankAccount {
    RankAccount {
        user_id: row.0,
        group_id: row.1,
        monthly_points: row.2,
        accumulated_points: row.3,
    }
}

/// Load a user's ranking account
pub async fn get_account(pool: &SqlitePool, user_id: &str) -> Result<Option<RankAccount>> {
    let row: Option<AccountRow> = sqlx::query_as(
        r#"
        SELECT user_id, group_id, monthly_points, accumulated_points
        FROM rank_accounts
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(to_account))
}

/// Create or overwrite a ranking account
///
/// Used for registration and seeding. Rejects negative accumulated points.
pub async fn upsert_account(pool: &SqlitePool, account: &RankAccount) -> Result<()> {
    if account.accumulated_points < 0 {
        return Err(Error::InvalidInput(format!(
            "accumulated points must be >= 0 (got {})",
            account.accumulated_points
        )));
    }

    sqlx::query(
        r#"
        INSERT INTO rank_accounts (user_id, group_id, monthly_points, accumulated_points, updated_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            group_id = excluded.group_id,
            monthly_points = excluded.monthly_points,
            accumulated_points = excluded.accumulated_points,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&account.user_id)
    .bind(account.group_id)
    .bind(account.monthly_points)
    .bind(account.accumulated_points)
    .bind(crate::time::now().to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Apply a signed point delta and return the refreshed account
///
/// `monthly_points` moves by the full delta. `accumulated_points` is floored
/// at zero. Returns [`Error::NotFound`] if the account does not exist.
/// Transient lock errors are retried for up to `max_lock_wait_ms`.
pub async fn apply_delta(
    pool: &SqlitePool,
    user_id: &str,
    delta: i64,
    max_lock_wait_ms: u64,
) -> Result<RankAccount> {
    retry_on_lock("apply_delta", max_lock_wait_ms, move || async move {
        let mut tx = pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE rank_accounts
            SET monthly_points = monthly_points + ?,
                accumulated_points = MAX(accumulated_points + ?, 0),
                updated_at = ?
            WHERE user_id = ?
            "#,
        )
        .bind(delta)
        .bind(delta)
        .bind(crate::time::now().to_rfc3339())
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(Error::NotFound(format!("rank account {}", user_id)));
        }

        let row: AccountRow = sqlx::query_as(
            r#"
            SELECT user_id, group_id, monthly_points, accumulated_points
            FROM rank_accounts
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(to_account(row))
    })
    .await
}
