//! Response cache for agentic results.
//!
//! LRU-bounded map with a fixed TTL. Expired entries are evicted lazily
//! when they are looked up; a hit moves the entry to most-recently-used.

use crate::types::RecommendationResult;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: RecommendationResult,
    expires_at: Instant,
}

/// Cache key for a request: limit plus the normalized request text
pub fn cache_key(text: &str, limit: usize) -> String {
    let normalized = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    format!("ag:{}:{}", limit, normalized)
}

/// Clones share the same underlying map
#[derive(Clone)]
pub struct ResponseCache {
    entries: Arc<Mutex<LruCache<String, CacheEntry>>>,
    ttl: Duration,
}

impl ResponseCache {
    /// * `capacity` - Maximum number of entries (at least 1)
    /// * `ttl` - Lifetime of an entry from its last write
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Arc::new(Mutex::new(LruCache::new(capacity))),
            ttl,
        }
    }

    pub async fn get(&self, key: &str) -> Option<RecommendationResult> {
        let mut entries = self.entries.lock().await;

        let expired = match entries.get(key) {
            None => return None,
            Some(entry) if Instant::now() < entry.expires_at => {
                return Some(entry.value.clone());
            }
            Some(_) => true,
        };

        if expired {
            debug!("Cache entry {} expired", key);
            entries.pop(key);
        }
        None
    }

    /// Insert or overwrite; evicts the least-recently-used entry when full
    pub async fn set(&self, key: impl Into<String>, value: RecommendationResult) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + self.ttl,
        };

        let key = key.into();
        let mut entries = self.entries.lock().await;
        if let Some((previous, _)) = entries.push(key.clone(), entry) {
            if previous != key {
                debug!("Cache evicted {}", previous);
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        // 200 entries, 5 minute TTL
        Self::new(200, Duration::from_secs(300))
    }
}
