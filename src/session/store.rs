//! In-memory session registry

use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use super::{EditorSession, SessionError};

/// Shared, lockable session
pub type SessionHandle = Arc<Mutex<EditorSession>>;

struct Entry {
    handle: SessionHandle,
    last_seen: Instant,
}

/// Concurrent map of live editor sessions
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<Uuid, Entry>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with default settings
    pub fn create(&self) -> SessionHandle {
        let id = Uuid::new_v4();
        let handle = Arc::new(Mutex::new(EditorSession::new(id)));
        self.sessions.insert(id, Entry { handle: handle.clone(), last_seen: Instant::now() });
        info!(session_id = %id, "Session created");
        handle
    }

    /// Look up a session and mark it as active
    pub fn get(&self, id: Uuid) -> Result<SessionHandle, SessionError> {
        let mut entry = self.sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        entry.last_seen = Instant::now();
        Ok(entry.handle.clone())
    }

    pub fn remove(&self, id: Uuid) -> Result<(), SessionError> {
        self.sessions
            .remove(&id)
            .map(|_| info!(session_id = %id, "Session removed"))
            .ok_or(SessionError::NotFound(id))
    }

    /// Drop sessions nobody has touched for `idle_ttl`
    ///
    /// Returns the number of sessions removed.
    pub fn evict_idle(&self, idle_ttl: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, entry| entry.last_seen.elapsed() < idle_ttl);
        let evicted = before.saturating_sub(self.sessions.len());

        if evicted > 0 {
            info!(evicted, remaining = self.sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Periodically evict idle sessions from `store` for the life of the process
pub async fn sweep_idle_sessions(store: Arc<SessionStore>, idle_ttl: Duration, every: Duration) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        store.evict_idle(idle_ttl);
    }
}
