use std::num::NonZeroUsize;
use std::time::Duration;

use lru::LruCache;
use tokio::time::Instant;

/// LRU cache whose entries also expire `ttl` after insertion.
pub struct TtlCache<V> {
    entries: LruCache<String, (Instant, V)>,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    /// A zero `capacity` is rounded up to one entry.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            ttl,
        }
    }

    /// Fresh value for `key`, marking it most recently used. Expired entries
    /// are dropped on the way.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let (inserted_at, value) = self.entries.get(key)?;
        if inserted_at.elapsed() < self.ttl {
            return Some(value.clone());
        }
        self.entries.pop(key);
        None
    }

    pub fn insert(&mut self, key: String, value: V) {
        self.entries.put(key, (Instant::now(), value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let mut cache = TtlCache::new(10, Duration::from_secs(60));
        cache.insert("q".to_string(), "answer".to_string());
        assert_eq!(cache.get("q").as_deref(), Some("answer"));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.get("q"), None);
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_cache_evicts_least_recently_used() {
        let mut cache = TtlCache::new(2, Duration::from_secs(3600));
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        cache.insert("c".to_string(), 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(2));
        assert_eq!(cache.get("c"), Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_keeps_entry_alive() {
        let mut cache = TtlCache::new(2, Duration::from_secs(3600));
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        assert_eq!(cache.get("a"), Some(1));

        cache.insert("c".to_string(), 3);

        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("b"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_does_not_evict() {
        let mut cache = TtlCache::new(2, Duration::from_secs(3600));
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);
        cache.insert("b".to_string(), 20);

        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("b"), Some(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_restarts_ttl() {
        let mut cache = TtlCache::new(2, Duration::from_secs(60));
        cache.insert("q".to_string(), 1);
        tokio::time::advance(Duration::from_secs(50)).await;
        cache.insert("q".to_string(), 2);
        tokio::time::advance(Duration::from_secs(50)).await;

        assert_eq!(cache.get("q"), Some(2));
    }
}
