// Per-dashboard serialization of snapshot and restore
use crate::domain::dashboard_id::DashboardId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Default)]
pub struct DashboardLocks {
    locks: Mutex<HashMap<DashboardId, Arc<AsyncMutex<()>>>>,
}

impl DashboardLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `dashboard_id`; released when the guard drops
    pub async fn lock(&self, dashboard_id: &DashboardId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            // only the map itself still holds released locks
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(dashboard_id.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks.lock().map(|locks| locks.len()).unwrap_or_default()
    }
}
