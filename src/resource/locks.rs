//! Per-identifier mutual exclusion for read-modify-write.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::errors::{StoreError, StoreResult};

/// Lock registry keyed by document id.
///
/// Slots are created on demand and dropped once no caller holds or waits
/// on them, so the map only grows with in-flight ids.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` while holding the lock for `key`.
    pub fn with_lock<T>(&self, key: &str, f: impl FnOnce() -> T) -> StoreResult<T> {
        let slot = {
            let mut slots = self.slots()?;
            Arc::clone(slots.entry(key.to_string()).or_default())
        };

        let result = {
            let _guard = slot.lock().map_err(|_| StoreError::Poisoned("document lock"))?;
            f()
        };

        // Registry entry + our clone: nobody else is waiting on this slot
        let mut slots = self.slots()?;
        if Arc::strong_count(&slot) == 2 {
            slots.remove(key);
        }

        Ok(result)
    }

    /// Number of ids currently locked or awaited
    pub fn in_flight(&self) -> StoreResult<usize> {
        Ok(self.slots()?.len())
    }

    fn slots(&self) -> StoreResult<std::sync::MutexGuard<'_, HashMap<String, Arc<Mutex<()>>>>> {
        self.slots
            .lock()
            .map_err(|_| StoreError::Poisoned("lock registry"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_slot_released_after_use() {
        let locks = KeyedLocks::new();
        let value = locks.with_lock("a", || 42).unwrap();
        assert_eq!(value, 42);
        assert_eq!(locks.in_flight().unwrap(), 0);
    }

    #[test]
    fn test_same_key_is_exclusive() {
        let locks = Arc::new(KeyedLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                let max_seen = Arc::clone(&max_seen);
                thread::spawn(move || {
                    for _ in 0..50 {
                        locks
                            .with_lock("same", || {
                                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                                max_seen.fetch_max(now, Ordering::SeqCst);
                                inside.fetch_sub(1, Ordering::SeqCst);
                            })
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(locks.in_flight().unwrap(), 0);
    }
}
