use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::KeyValueStore,
    error::{AppError, AppResult},
    services::{handoff::ResultHandoff, providers::CatalogProvider, suggestions::SuggestionController},
};

/// One user's search input: its live suggestions and its results handoff
pub struct SearchSession {
    pub id: Uuid,
    pub suggestions: SuggestionController,
    pub handoff: ResultHandoff,
    last_seen: Mutex<Instant>,
}

impl SearchSession {
    fn touch(&self) {
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    fn idle_for(&self, now: Instant) -> Duration {
        let last_seen = *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner);
        now.saturating_duration_since(last_seen)
    }
}

/// In-process registry of search sessions
///
/// Sessions idle for longer than the TTL are pruned whenever a new one is
/// created; their handoff entries expire from the store on the same TTL.
pub struct SessionRegistry {
    provider: Arc<dyn CatalogProvider>,
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
    sessions: RwLock<HashMap<Uuid, Arc<SearchSession>>>,
}

impl SessionRegistry {
    pub fn new(
        provider: Arc<dyn CatalogProvider>,
        store: Arc<dyn KeyValueStore>,
        ttl_secs: u64,
    ) -> Self {
        Self {
            provider,
            store,
            ttl: Duration::from_secs(ttl_secs),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Opens a session whose suggestions are capped at `suggestion_limit`
    pub async fn create(&self, suggestion_limit: usize) -> Arc<SearchSession> {
        let id = Uuid::new_v4();
        let session = Arc::new(SearchSession {
            id,
            suggestions: SuggestionController::new(self.provider.clone(), suggestion_limit),
            handoff: ResultHandoff::new(self.store.clone(), id, self.ttl.as_secs()),
            last_seen: Mutex::new(Instant::now()),
        });

        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|_, existing| existing.idle_for(now) <= self.ttl);
        let pruned = before - sessions.len();
        sessions.insert(id, session.clone());

        tracing::info!(
            session_id = %id,
            suggestion_limit = session.suggestions.limit(),
            pruned,
            active = sessions.len(),
            "Search session created"
        );

        session
    }

    /// Looks up a live session and marks it as used
    pub async fn get(&self, id: Uuid) -> AppResult<Arc<SearchSession>> {
        let sessions = self.sessions.read().await;
        let session = sessions
            .get(&id)
            .filter(|session| session.idle_for(Instant::now()) <= self.ttl)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Search session {} not found", id)))?;
        session.touch();
        Ok(session)
    }

    /// Drops a session; returns whether it existed
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            tracing::info!(session_id = %id, "Search session closed");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::services::providers::MockCatalogProvider;

    fn registry(ttl_secs: u64) -> SessionRegistry {
        SessionRegistry::new(
            Arc::new(MockCatalogProvider::new()),
            Arc::new(MemoryStore::new()),
            ttl_secs,
        )
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let registry = registry(60);
        let session = registry.create(16).await;

        let found = registry.get(session.id).await.unwrap();
        assert_eq!(found.id, session.id);
        assert_eq!(found.suggestions.limit(), 16);
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_session_not_found() {
        let registry = registry(60);
        let result = registry.get(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_remove() {
        let registry = registry(60);
        let session = registry.create(8).await;

        assert!(registry.remove(session.id).await);
        assert!(!registry.remove(session.id).await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_idle_sessions_pruned_on_create() {
        let registry = registry(0);
        let stale = registry.create(8).await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        let fresh = registry.create(8).await;
        assert!(registry.get(stale.id).await.is_err());
        assert_eq!(registry.len().await, 1);
        assert_ne!(fresh.id, stale.id);
    }
}
