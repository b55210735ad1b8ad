use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// Hands out one async mutex per aggregate id.
///
/// Engines hold the guard across the whole read-decide-write-record sequence
/// for a wallet or a subscription owner, so two concurrent mutations of the
/// same aggregate serialize and balance checks are never interleaved with
/// debits. Entries are never evicted; the map is bounded by the number of
/// live aggregates.
#[derive(Default)]
pub struct LockMap {
    entries: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl LockMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, id: Uuid) -> OwnedMutexGuard<()> {
        let entry = {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            entries.entry(id).or_default().clone()
        };
        entry.lock_owned().await
    }
}
