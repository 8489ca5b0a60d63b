//! Lock-contention retry for ledger writes
//!
//! Submissions for different users update `rank_accounts` from separate pool
//! connections, so a write can find the database locked. Such a write is
//! repeated after a growing pause until its wait budget is spent. Any other
//! error is returned on the first attempt. Callers of the ledger never retry.

use std::time::{Duration, Instant};

use crate::{Error, Result};

/// Default wait budget before a locked ledger write is reported as failed
pub const DEFAULT_MAX_LOCK_WAIT_MS: u64 = 5000;

const FIRST_PAUSE: Duration = Duration::from_millis(10);
const MAX_PAUSE: Duration = Duration::from_secs(1);

/// Pauses between attempts: 10 ms doubling up to 1 s, never past the deadline
struct LockBackoff {
    deadline: Instant,
    next: Duration,
}

impl LockBackoff {
    fn new(max_wait: Duration) -> Self {
        Self {
            deadline: Instant::now() + max_wait,
            next: FIRST_PAUSE,
        }
    }

    /// Next pause, or `None` once the budget is spent
    fn next_pause(&mut self) -> Option<Duration> {
        let remaining = self.deadline.checked_duration_since(Instant::now())?;
        if remaining.is_zero() {
            return None;
        }
        let pause = self.next.min(remaining);
        self.next = (self.next * 2).min(MAX_PAUSE);
        Some(pause)
    }
}

/// Run `operation`, repeating it while SQLite reports the database locked
///
/// `label` names the write in log output. After `max_wait_ms` of contention
/// the write fails with [`Error::Internal`].
pub async fn retry_on_lock<F, Fut, T>(
    label: &str,
    max_wait_ms: u64,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut backoff = LockBackoff::new(Duration::from_millis(max_wait_ms));
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        let err = match operation().await {
            Ok(value) => {
                if attempts > 1 {
                    tracing::debug!(label, attempts, "Ledger write went through after contention");
                }
                return Ok(value);
            }
            Err(err) if err.is_database_locked() => err,
            Err(err) => return Err(err),
        };

        match backoff.next_pause() {
            Some(pause) => {
                tracing::warn!(
                    label,
                    attempts,
                    pause_ms = pause.as_millis() as u64,
                    "Ledger locked, retrying"
                );
                tokio::time::sleep(pause).await;
            }
            None => {
                tracing::error!(
                    label,
                    attempts,
                    max_wait_ms,
                    "Ledger still locked, giving up: {}",
                    err
                );
                return Err(Error::Internal(format!(
                    "{} still locked after {} attempts ({} ms budget)",
                    label, attempts, max_wait_ms
                )));
            }
        }
    }
}
