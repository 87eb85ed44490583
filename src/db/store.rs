use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::error::AppResult;

/// String key-value store with per-entry expiry
///
/// Backs both the session handoff and the upstream response cache, so the
/// search components never depend on a concrete storage client.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a single key, `None` when absent or expired
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Writes a single key with a TTL in seconds
    async fn set(&self, key: &str, value: String, ttl: u64) -> AppResult<()>;

    /// Reads several keys at once, in the order given
    async fn get_many(&self, keys: &[String]) -> AppResult<Vec<Option<String>>>;

    /// Writes several keys atomically: readers see all of them or none
    async fn set_many(&self, entries: Vec<(String, String)>, ttl: u64) -> AppResult<()>;

    /// Store name for logging
    fn name(&self) -> &'static str;
}

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn new(value: String, ttl: u64) -> Self {
        Self {
            value,
            expires_at: Instant::now() + Duration::from_secs(ttl),
        }
    }

    fn live_value(&self, now: Instant) -> Option<String> {
        (now < self.expires_at).then(|| self.value.clone())
    }
}

/// In-process store for single-node deployments and tests
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

}

/// Drops every expired entry; run on each write so dead keys never pile up
fn evict_expired(entries: &mut HashMap<String, Entry>, now: Instant) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| now < entry.expires_at);
    before - entries.len()
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .and_then(|entry| entry.live_value(Instant::now())))
    }

    async fn set(&self, key: &str, value: String, ttl: u64) -> AppResult<()> {
        let mut entries = self.entries.write().await;
        evict_expired(&mut entries, Instant::now());
        entries.insert(key.to_string(), Entry::new(value, ttl));
        Ok(())
    }

    async fn get_many(&self, keys: &[String]) -> AppResult<Vec<Option<String>>> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(keys
            .iter()
            .map(|key| entries.get(key).and_then(|entry| entry.live_value(now)))
            .collect())
    }

    async fn set_many(&self, new_entries: Vec<(String, String)>, ttl: u64) -> AppResult<()> {
        let mut entries = self.entries.write().await;
        let evicted = evict_expired(&mut entries, Instant::now());
        if evicted > 0 {
            tracing::trace!(evicted, "Evicted expired entries");
        }
        for (key, value) in new_entries {
            entries.insert(key, Entry::new(value, ttl));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_key() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let store = MemoryStore::new();
        store.set("k", "v".to_string(), 60).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_expired_entry_is_absent() {
        let store = MemoryStore::new();
        store.set("k", "v".to_string(), 0).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_writes_evict_expired_entries() {
        let store = MemoryStore::new();
        for session in 0..500 {
            let entries = ["searchQuery", "searchResults", "totalResults", "searchPages"]
                .iter()
                .map(|name| (format!("handoff:{}:{}", session, name), "x".to_string()))
                .collect();
            store.set_many(entries, 0).await.unwrap();
        }
        assert!(store.entries.read().await.len() <= 4);

        store.set("live", "v".to_string(), 60).await.unwrap();
        assert_eq!(store.entries.read().await.len(), 1);
        assert_eq!(store.get("live").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test]
    async fn test_get_many_preserves_key_order() {
        let store = MemoryStore::new();
        store
            .set_many(
                vec![
                    ("a".to_string(), "1".to_string()),
                    ("c".to_string(), "3".to_string()),
                ],
                60,
            )
            .await
            .unwrap();

        let values = store
            .get_many(&["c".to_string(), "b".to_string(), "a".to_string()])
            .await
            .unwrap();
        assert_eq!(
            values,
            vec![Some("3".to_string()), None, Some("1".to_string())]
        );
    }
}
