//! Per-user lock registry
//!
//! Serializes the read-cap-write sequence for one user while letting
//! different users proceed in parallel. Entries are removed once no request
//! holds or waits on them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Registry = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

#[derive(Clone, Default)]
pub struct UserLocks {
    registry: Registry,
}

/// Exclusive access to one user's ledger until dropped
pub struct UserLockGuard {
    user_id: String,
    registry: Registry,
    guard: Option<OwnedMutexGuard<()>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `user_id`
    pub async fn acquire(&self, user_id: &str) -> UserLockGuard {
        let lock = {
            let mut map = self.registry.lock().unwrap_or_else(|e| e.into_inner());
            map.entry(user_id.to_string()).or_default().clone()
        };
        let guard = lock.lock_owned().await;

        UserLockGuard {
            user_id: user_id.to_string(),
            registry: Arc::clone(&self.registry),
            guard: Some(guard),
        }
    }

    /// Number of users with a live entry
    pub fn active_users(&self) -> usize {
        self.registry.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Drop for UserLockGuard {
    fn drop(&mut self) {
        // Release first so the count below only sees the map and any waiters
        drop(self.guard.take());

        let mut map = self.registry.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(lock) = map.get(&self.user_id) {
            if Arc::strong_count(lock) == 1 {
                map.remove(&self.user_id);
            }
        }
    }
}
