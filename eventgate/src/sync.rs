//! Keyed write serialization
//!
//! The store gives no transactional guarantees, so the gateway serializes
//! conflicting writes in-process: result merges per event id, creates per
//! `(brand, baseSlug)`. Locks live in a map keyed by string; entries are
//! evicted when the last holder releases. Waits are bounded — a caller that
//! cannot acquire within the window gets `BUSY` rather than queueing
//! indefinitely.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::Error;

pub const DEFAULT_WAIT: Duration = Duration::from_secs(10);

type LockMap = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// A map of named mutexes with refcount-based eviction.
#[derive(Clone)]
pub struct KeyedLocks {
    inner: LockMap,
    wait: Duration,
}

impl Default for KeyedLocks {
    fn default() -> Self {
        Self::new(DEFAULT_WAIT)
    }
}

impl KeyedLocks {
    pub fn new(wait: Duration) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            wait,
        }
    }

    /// Acquire the lock for `key`, waiting at most the configured window.
    pub async fn acquire(&self, key: &str) -> Result<KeyedGuard, Error> {
        let lock = self
            .inner
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        match tokio::time::timeout(self.wait, lock.clone().lock_owned()).await {
            Ok(guard) => Ok(KeyedGuard {
                key: key.to_string(),
                map: Arc::clone(&self.inner),
                guard: Some(guard),
            }),
            Err(_) => {
                drop(lock);
                self.evict(key);
                Err(Error::Busy(format!("another write is in progress for {key}")))
            }
        }
    }

    /// Key for result-merge serialization.
    pub fn event_key(event_id: &str) -> String {
        format!("event:{event_id}")
    }

    /// Key for create serialization.
    pub fn create_key(brand_id: &str, base_slug: &str) -> String {
        format!("create:{brand_id}:{base_slug}")
    }

    fn evict(&self, key: &str) {
        // only the map's own reference left: nobody holds or awaits it
        self.inner.remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// Releases the keyed lock (and evicts the idle entry) on drop.
#[derive(Debug)]
pub struct KeyedGuard {
    key: String,
    map: LockMap,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyedGuard {
    fn drop(&mut self) {
        self.guard.take();
        self.map.remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}
