// TTL page cache - LRU-bounded in-memory store with per-entry expiry

use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use crate::infrastructure::traits::PageCache;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: String,
    pub inserted_at: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn new(value: String, ttl: Duration) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
            ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() >= self.ttl
    }
}

pub struct Cache<K, V> {
    inner: LruCache<K, V>,
}

impl<K: std::hash::Hash + Eq, V> Cache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Cache {
            inner: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
        }
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.inner.get(key)
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.inner.put(key, value);
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.inner.pop(key)
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Default [`PageCache`]: expired entries are dropped on read.
pub struct TtlCache {
    entries: Mutex<Cache<String, CacheEntry>>,
}

impl TtlCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Cache::new(capacity)),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

impl std::fmt::Debug for TtlCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache").finish_non_exhaustive()
    }
}

#[async_trait]
impl PageCache for TtlCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().await;
        let key = key.to_string();
        let expired = match entries.get(&key) {
            Some(entry) if !entry.is_expired() => {
                debug!("Page cache hit for {}", key);
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            debug!("Page cache entry for {} expired", key);
            entries.remove(&key);
        }
        None
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), CacheEntry::new(value, ttl));
    }

    async fn clear(&self) {
        self.entries.lock().await.clear();
        debug!("Page cache cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = TtlCache::new(10);
        cache.set("index", "<html>".to_string(), Duration::from_secs(20)).await;
        assert_eq!(cache.get("index").await.as_deref(), Some("<html>"));
        assert_eq!(cache.get("missing").await, None);
    }

    #[tokio::test]
    async fn test_expired_entries_are_dropped() {
        let cache = TtlCache::new(10);
        cache.set("index", "stale".to_string(), Duration::from_millis(10)).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get("index").await, None);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_zero_ttl_never_serves() {
        let cache = TtlCache::new(10);
        cache.set("index", "page".to_string(), Duration::ZERO).await;
        assert_eq!(cache.get("index").await, None);
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let cache = TtlCache::new(10);
        cache.set("a", "1".to_string(), Duration::from_secs(20)).await;
        cache.set("b", "2".to_string(), Duration::from_secs(20)).await;
        cache.clear().await;
        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.get("b").await, None);
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recently_used() {
        let cache = TtlCache::new(2);
        let ttl = Duration::from_secs(20);
        cache.set("a", "1".to_string(), ttl).await;
        cache.set("b", "2".to_string(), ttl).await;
        cache.get("a").await;
        cache.set("c", "3".to_string(), ttl).await;

        assert_eq!(cache.get("a").await.as_deref(), Some("1"));
        assert_eq!(cache.get("b").await, None);
        assert_eq!(cache.get("c").await.as_deref(), Some("3"));
    }
}
