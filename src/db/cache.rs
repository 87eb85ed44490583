use std::fmt::Display;
use std::sync::Arc;

use tokio::{sync::mpsc, task::JoinHandle};

use crate::db::KeyValueStore;
use crate::error::{AppError, AppResult};
use crate::models::BrowseList;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    BrowseList(BrowseList),
    MovieDetails(u64),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::BrowseList(list) => write!(f, "browse:{}", list),
            CacheKey::MovieDetails(id) => write!(f, "movie:{}", id),
        }
    }
}

/// Message for asynchronous cache writes
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// Typed JSON cache over a [`KeyValueStore`]
///
/// Reads go straight to the store; writes are handed to a background task so
/// a response never waits on the cache.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn KeyValueStore>,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    writer: JoinHandle<()>,
}

impl CacheWriterHandle {
    /// Initiates a graceful shutdown of the cache writer
    ///
    /// Signals the writer task and waits until it has flushed every pending
    /// write and exited.
    pub async fn shutdown(self) {
        if self.shutdown_tx.send(()).await.is_err() {
            tracing::warn!("Cache writer already stopped");
        }
        if let Err(e) = self.writer.await {
            tracing::error!(error = %e, "Cache writer task failed");
        }
    }
}

impl Cache {
    /// Creates a new Cache and spawns its background writer
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(store: Arc<dyn KeyValueStore>) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let writer_store = store.clone();
        let writer = tokio::spawn(async move {
            Self::cache_writer_task(writer_store, write_rx, shutdown_rx).await;
        });

        let cache = Self { store, write_tx };
        let handle = CacheWriterHandle {
            shutdown_tx,
            writer,
        };

        (cache, handle)
    }

    /// Background task that drains cache write messages into the store
    ///
    /// On shutdown, flushes whatever is already queued and exits.
    async fn cache_writer_task(
        store: Arc<dyn KeyValueStore>,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!(store = store.name(), "Cache writer task started");

        loop {
            tokio::select! {
                Some(msg) = write_rx.recv() => {
                    if let Err(e) = store.set(&msg.key, msg.value, msg.ttl).await {
                        tracing::error!(error = %e, key = %msg.key, "Failed to write cache entry");
                    }
                }
                _ = shutdown_rx.recv() => {
                    write_rx.close();
                    let mut flushed = 0;
                    while let Some(msg) = write_rx.recv().await {
                        if let Err(e) = store.set(&msg.key, msg.value, msg.ttl).await {
                            tracing::error!(error = %e, "Failed to flush cache write during shutdown");
                        } else {
                            flushed += 1;
                        }
                    }

                    tracing::info!(flushed, "Cache writer task stopped");
                    break;
                }
            }
        }
    }

    /// Retrieves a value from the cache by key
    ///
    /// Returns `None` when the key is absent or expired.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let cached = self.store.get(&key.to_string()).await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Queues a value for storage without waiting for the write
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let msg = CacheWriteMessage {
            key: key.to_string(),
            value: json,
            ttl,
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to send cache write message");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    #[test]
    fn test_cache_key_display_browse_list() {
        let key = CacheKey::BrowseList(BrowseList::TopRated);
        assert_eq!(format!("{}", key), "browse:top_rated");
    }

    #[test]
    fn test_cache_key_display_movie_details() {
        let key = CacheKey::MovieDetails(438631);
        assert_eq!(format!("{}", key), "movie:438631");
    }

    #[tokio::test]
    async fn test_cache_miss() {
        let (cache, _handle) = Cache::new(Arc::new(MemoryStore::new()));

        let key = CacheKey::MovieDetails(12345);
        let retrieved: Option<Vec<String>> = cache.get_from_cache(&key).await.unwrap();

        assert_eq!(retrieved, None);
    }

    #[tokio::test]
    async fn test_set_in_background_writes_to_cache() {
        let (cache, _handle) = Cache::new(Arc::new(MemoryStore::new()));

        let key = CacheKey::BrowseList(BrowseList::Trending);
        let value = vec!["item1".to_string(), "item2".to_string()];

        cache.set_in_background(&key, &value, 60);

        // Give the background task time to process
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let retrieved: Option<Vec<String>> = cache.get_from_cache(&key).await.unwrap();
        assert_eq!(retrieved, Some(value));
    }

    #[tokio::test]
    async fn test_cache_writer_graceful_shutdown_flushes() {
        let store = Arc::new(MemoryStore::new());
        let (cache, handle) = Cache::new(store.clone());

        let keys_values = vec![
            (CacheKey::MovieDetails(1), vec!["a".to_string()]),
            (CacheKey::MovieDetails(2), vec!["b".to_string()]),
            (CacheKey::MovieDetails(3), vec!["c".to_string()]),
        ];
        for (key, value) in &keys_values {
            cache.set_in_background(key, value, 60);
        }

        // No sleep: shutdown returns only once the flush is done.
        handle.shutdown().await;

        for (key, expected_value) in &keys_values {
            let retrieved: Option<Vec<String>> = cache.get_from_cache(key).await.unwrap();
            assert_eq!(retrieved.as_ref(), Some(expected_value));
        }
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_internal_error() {
        let store = Arc::new(MemoryStore::new());
        store
            .set("movie:9", "not json".to_string(), 60)
            .await
            .unwrap();
        let (cache, _handle) = Cache::new(store);

        let result: AppResult<Option<Vec<String>>> =
            cache.get_from_cache(&CacheKey::MovieDetails(9)).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
