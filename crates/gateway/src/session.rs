//! Per-client session store.
//!
//! Sessions are keyed by an opaque id (the AG-UI `threadId` or the
//! `session_id` of `/chat`). Each entry sits behind its own mutex so two
//! turns on the same session never interleave, while turns on different
//! sessions run concurrently.

use chrono::{Duration, Utc};
use fisibot_config::MAX_SESSION_TIMEOUT_SECS;
use fisibot_core::SessionState;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

pub type SharedSession = Arc<Mutex<SessionState>>;

pub struct SessionStore {
    sessions: RwLock<HashMap<String, SharedSession>>,
    timeout: Duration,
}

impl SessionStore {
    pub fn new(timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            timeout,
        }
    }

    /// Timeouts above the configurable maximum are clamped to it.
    pub fn from_secs(timeout_secs: u64) -> Self {
        let secs = timeout_secs.min(MAX_SESSION_TIMEOUT_SECS);
        let timeout = i64::try_from(secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or_else(|| Duration::days(30));
        Self::new(timeout)
    }

    /// Return the session for `id`, creating a fresh one when it is missing
    /// or has been idle past the timeout.
    ///
    /// A session whose lock is held is mid-turn and therefore never expired.
    pub async fn get_or_create(&self, id: &str) -> SharedSession {
        {
            let sessions = self.sessions.read().await;
            if let Some(existing) = sessions.get(id) {
                if !self.expired(existing) {
                    return existing.clone();
                }
            }
        }

        let mut sessions = self.sessions.write().await;
        if let Some(existing) = sessions.get(id) {
            if !self.expired(existing) {
                return existing.clone();
            }
            debug!(session_id = %id, "Session expired, starting fresh");
        }
        let fresh = Arc::new(Mutex::new(SessionState::new()));
        sessions.insert(id.to_string(), fresh.clone());
        fresh
    }

    /// Drop every idle session past the timeout. Returns how many went.
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !self.expired(session));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    fn expired(&self, session: &SharedSession) -> bool {
        match session.try_lock() {
            Ok(state) => state.is_expired(Utc::now(), self.timeout),
            Err(_) => false,
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::from_secs(7200)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_id_returns_same_session() {
        let store = SessionStore::default();
        let a = store.get_or_create("hilo-1").await;
        a.lock().await.last_topic = Some("Ondas".into());

        let b = store.get_or_create("hilo-1").await;
        assert_eq!(b.lock().await.last_topic.as_deref(), Some("Ondas"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn different_ids_are_isolated() {
        let store = SessionStore::default();
        store.get_or_create("a").await.lock().await.last_topic = Some("Cinemática".into());
        let other = store.get_or_create("b").await;
        assert!(other.lock().await.last_topic.is_none());
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn huge_timeout_is_clamped() {
        let store = SessionStore::from_secs(u64::MAX);
        assert_eq!(store.timeout, Duration::seconds(MAX_SESSION_TIMEOUT_SECS as i64));

        let session = store.get_or_create("larga").await;
        session.lock().await.last_active = Utc::now() - Duration::days(365);
        assert_eq!(store.purge_expired().await, 1);
    }

    #[tokio::test]
    async fn expired_session_is_replaced() {
        let store = SessionStore::new(Duration::seconds(60));
        let old = store.get_or_create("viejo").await;
        {
            let mut state = old.lock().await;
            state.last_topic = Some("Ondas".into());
            state.last_active = Utc::now() - Duration::seconds(120);
        }

        let fresh = store.get_or_create("viejo").await;
        assert!(fresh.lock().await.last_topic.is_none());
    }

    #[tokio::test]
    async fn purge_drops_only_idle_sessions() {
        let store = SessionStore::new(Duration::seconds(60));
        store.get_or_create("activa").await;
        let idle = store.get_or_create("inactiva").await;
        idle.lock().await.last_active = Utc::now() - Duration::seconds(600);

        assert_eq!(store.purge_expired().await, 1);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn locked_session_survives_purge() {
        let store = SessionStore::new(Duration::seconds(60));
        let busy = store.get_or_create("ocupada").await;
        let mut guard = busy.lock().await;
        guard.last_active = Utc::now() - Duration::seconds(600);

        assert_eq!(store.purge_expired().await, 0);
        drop(guard);
        assert_eq!(store.purge_expired().await, 1);
        assert!(store.is_empty().await);
    }
}
