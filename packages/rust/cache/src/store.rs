//! The shared content cache.
//!
//! A [`ContentCache`] is a cheap, cloneable handle to one keyed store. Clones
//! share the same entries, so the application state can hand the same cache
//! to every coordinator and reader. There is no eviction: the store only
//! shrinks when [`ContentCache::clear`] is called.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::key::CacheKey;

/// Keyed store of previously fetched content payloads.
#[derive(Debug, Clone, Default)]
pub struct ContentCache {
    entries: Arc<RwLock<HashMap<CacheKey, Arc<Value>>>>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` is present.
    pub async fn has(&self, key: &CacheKey) -> bool {
        self.entries.read().await.contains_key(key)
    }

    /// The payload stored under `key`, if any.
    pub async fn get(&self, key: &CacheKey) -> Option<Arc<Value>> {
        self.entries.read().await.get(key).cloned()
    }

    /// Insert or overwrite the payload under `key`.
    pub async fn set(&self, key: CacheKey, payload: Value) {
        let mut entries = self.entries.write().await;
        entries.insert(key, Arc::new(payload));
    }

    /// Insert several entries under a single write lock.
    ///
    /// Readers observe either none or all of `items`. Returns the number of
    /// entries in the cache afterwards.
    pub async fn set_many(&self, items: Vec<(CacheKey, Value)>) -> usize {
        let mut entries = self.entries.write().await;
        for (key, payload) in items {
            debug!(%key, "cached");
            entries.insert(key, Arc::new(payload));
        }
        entries.len()
    }

    /// Remove every entry.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        let removed = entries.len();
        entries.clear();
        info!(removed, "cache cleared");
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
