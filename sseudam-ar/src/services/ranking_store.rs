//! SQLite ranking ledger adapter

use async_trait::async_trait;
use sqlx::SqlitePool;
use sseudam_common::db::{ranking, RankAccount, DEFAULT_MAX_LOCK_WAIT_MS};

use super::RankingStore;

pub struct SqliteRankingStore {
    pool: SqlitePool,
    max_lock_wait_ms: u64,
}

impl SqliteRankingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            max_lock_wait_ms: DEFAULT_MAX_LOCK_WAIT_MS,
        }
    }

    pub fn with_max_lock_wait(mut self, max_lock_wait_ms: u64) -> Self {
        self.max_lock_wait_ms = max_lock_wait_ms;
        self
    }
}

#[async_trait]
impl RankingStore for SqliteRankingStore {
    async fn get(&self, user_id: &str) -> sseudam_common::Result<Option<RankAccount>> {
        ranking::get_account(&self.pool, user_id).await
    }

    async fn apply_delta(&self, user_id: &str, delta: i64) -> sseudam_common::Result<RankAccount> {
        ranking::apply_delta(&self.pool, user_id, delta, self.max_lock_wait_ms).await
    }
}
