//! SQLite analysis history adapter

use async_trait::async_trait;
use sqlx::SqlitePool;
use sseudam_common::db::{analysis_results, AnalysisRecord};

use super::AnalysisRecordStore;

pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalysisRecordStore for SqliteRecordStore {
    async fn save(&self, record: &AnalysisRecord) -> sseudam_common::Result<i64> {
        analysis_results::save_record(&self.pool, record).await
    }
}
