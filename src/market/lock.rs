use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Per-event advisory lock serializing market reconciliation.
///
/// Recalculations for different events never contend. Share one instance
/// (behind an `Arc`) between every caller that can trigger a recalculation.
#[derive(Default)]
pub struct EventLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

/// Held for the duration of one find/create/update sequence.
pub struct EventGuard {
    _guard: OwnedMutexGuard<()>,
}

impl EventLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, event_id: &str) -> EventGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            // Drop entries nobody holds or waits on.
            locks.retain(|_, l| Arc::strong_count(l) > 1);
            locks
                .entry(event_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        EventGuard {
            _guard: lock.lock_owned().await,
        }
    }

    pub fn tracked(&self) -> usize {
        self.locks.lock().map(|l| l.len()).unwrap_or(0)
    }
}
