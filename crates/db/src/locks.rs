//! Per-calendar locks for positioning inserts
//!
//! Computing a key reads the current first or last entry of a calendar and then
//! writes the new entry. Two inserts into the same calendar must not interleave
//! between those steps, while inserts into different calendars run freely.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, Weak};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Purge dead entries every this many acquisitions
const CLEANUP_INTERVAL: usize = 64;

/// Only purge once the map holds more than this many entries
const CLEANUP_THRESHOLD: usize = 128;

/// Map from calendar id to an async mutex.
///
/// Entries are kept as `Weak` references and dropped once no guard is alive.
#[derive(Default)]
pub struct ListLocks {
    locks: std::sync::Mutex<HashMap<String, Weak<Mutex<()>>>>,
    acquire_counter: AtomicUsize,
}

/// Guard holding a calendar lock until dropped
pub struct ListGuard {
    _guard: OwnedMutexGuard<()>,
}

impl ListLocks {
    /// Create an empty lock map
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `calendar`.
    pub async fn acquire(&self, calendar: &str) -> ListGuard {
        let mutex = {
            let mut map = self.locks.lock().unwrap_or_else(PoisonError::into_inner);

            let mutex = map
                .get(calendar)
                .and_then(Weak::upgrade)
                .unwrap_or_else(|| {
                    let mutex = Arc::new(Mutex::new(()));
                    map.insert(calendar.to_string(), Arc::downgrade(&mutex));
                    mutex
                });

            let tick = self.acquire_counter.fetch_add(1, Ordering::Relaxed);
            if map.len() > CLEANUP_THRESHOLD && tick % CLEANUP_INTERVAL == 0 {
                map.retain(|_, weak| weak.strong_count() > 0);
            }

            mutex
        };

        ListGuard {
            _guard: mutex.lock_owned().await,
        }
    }

    /// Number of calendars currently tracked, live or not.
    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
