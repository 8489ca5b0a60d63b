//! Fake collaborators for failure-isolation tests

use async_trait::async_trait;
use sseudam_ar::error::DeliveryError;
use sseudam_ar::services::{HardwareChannel, LiveChannel, RankingStore};
use sseudam_common::db::RankAccount;
use std::sync::Mutex;
use std::time::Duration;

/// Display that records every value, or fails every send
#[derive(Default)]
pub struct RecordingDisplay {
    sent: Mutex<Vec<i64>>,
    pub fail: bool,
}

impl RecordingDisplay {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<i64> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl HardwareChannel for RecordingDisplay {
    async fn send(&self, success_rate: i64) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(success_rate);
        if self.fail {
            return Err(DeliveryError::Status(503));
        }
        Ok(())
    }
}

/// Live channel that always fails
pub struct FailingLive;

#[async_trait]
impl LiveChannel for FailingLive {
    async fn publish(&self, _topic: &str, _payload: serde_json::Value) -> Result<(), DeliveryError> {
        Err(DeliveryError::Transport("broker unavailable".into()))
    }
}

/// Ledger whose reads delegate and whose writes always fail
pub struct FailingLedger<R> {
    pub inner: R,
}

#[async_trait]
impl<R: RankingStore> RankingStore for FailingLedger<R> {
    async fn get(&self, user_id: &str) -> sseudam_common::Result<Option<RankAccount>> {
        self.inner.get(user_id).await
    }

    async fn apply_delta(&self, _user_id: &str, _delta: i64) -> sseudam_common::Result<RankAccount> {
        Err(sseudam_common::Error::Internal(
            "simulated write failure at /var/lib/sseudam/sseudam.db".into(),
        ))
    }
}

/// Ledger whose writes take `delay` before delegating
pub struct SlowLedger<R> {
    pub inner: R,
    pub delay: Duration,
}

#[async_trait]
impl<R: RankingStore> RankingStore for SlowLedger<R> {
    async fn get(&self, user_id: &str) -> sseudam_common::Result<Option<RankAccount>> {
        self.inner.get(user_id).await
    }

    async fn apply_delta(&self, user_id: &str, delta: i64) -> sseudam_common::Result<RankAccount> {
        tokio::time::sleep(self.delay).await;
        self.inner.apply_delta(user_id, delta).await
    }
}
