//! In-memory session store (non-persistent).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::Session;

/// Shared handle to one session. Holding the lock means owning the turn.
pub type SessionHandle = Arc<Mutex<Session>>;

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new session seeded with the greeting.
    pub async fn create(&self) -> (Uuid, SessionHandle) {
        let session = Session::new();
        let id = session.id();
        let handle = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id, handle.clone());
        tracing::debug!("Created session {}", id);
        (id, handle)
    }

    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Dispose of a session; returns whether it existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            tracing::debug!("Ended session {}", id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop sessions idle for longer than `idle_timeout`.
    ///
    /// Sessions with a turn in flight are locked and therefore kept.
    pub async fn remove_idle(&self, idle_timeout: Duration) -> usize {
        let Ok(idle_timeout) = chrono::Duration::from_std(idle_timeout) else {
            return 0;
        };
        let cutoff = Utc::now() - idle_timeout;

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => session.last_active() >= cutoff,
            Err(_) => true,
        });
        let removed = before - sessions.len();
        if removed > 0 {
            tracing::info!("Removed {} idle session(s)", removed);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_get_remove() {
        let store = SessionStore::new();
        let (id, handle) = store.create().await;

        assert_eq!(handle.lock().await.id(), id);
        assert!(store.get(id).await.is_some());
        assert_eq!(store.len().await, 1);

        assert!(store.remove(id).await);
        assert!(!store.remove(id).await);
        assert!(store.get(id).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        let (a, _) = store.create().await;
        let (b, _) = store.create().await;
        assert_ne!(a, b);

        let handle = store.get(a).await.unwrap();
        handle
            .lock()
            .await
            .set_credential(crate::credential::Credential::from_input("k").unwrap());

        assert!(store.get(a).await.unwrap().lock().await.has_credential());
        assert!(!store.get(b).await.unwrap().lock().await.has_credential());
    }

    #[tokio::test]
    async fn test_remove_idle_keeps_busy_and_fresh_sessions() {
        let store = SessionStore::new();
        let (fresh, _) = store.create().await;
        let (busy, busy_handle) = store.create().await;

        // Everything counts as idle with a zero timeout, except a locked session
        tokio::time::sleep(Duration::from_millis(5)).await;
        let _turn = busy_handle.lock().await;
        assert_eq!(store.remove_idle(Duration::ZERO).await, 1);
        assert!(store.get(fresh).await.is_none());
        assert!(store.get(busy).await.is_some());

        assert_eq!(store.remove_idle(Duration::from_secs(3600)).await, 0);
    }
}
