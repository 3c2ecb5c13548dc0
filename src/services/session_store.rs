use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::models::SessionPhase;
use crate::services::session::Session;

/// Shared, individually locked session
pub type SessionHandle = Arc<Mutex<Session>>;

/// The store already holds the maximum number of running sessions
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("Session limit of {max} reached")]
pub struct SessionLimitError {
    pub max: usize,
}

/// Storage for live sessions
///
/// Each session is isolated behind its own lock; the catalog is not part of the store.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores a new session and returns a handle to it
    ///
    /// With a `limit`, the insert fails once that many sessions are still running. Ended
    /// sessions do not count towards the limit. The check and the insert are atomic.
    async fn insert(
        &self,
        session: Session,
        limit: Option<usize>,
    ) -> Result<SessionHandle, SessionLimitError>;

    async fn get(&self, id: Uuid) -> Option<SessionHandle>;

    /// Drops a session. Returns `false` if it did not exist.
    async fn remove(&self, id: Uuid) -> bool;

    /// Number of stored sessions, ended ones included
    async fn len(&self) -> usize;
}

/// A session whose lock is held is in use and counts as running
fn is_running(handle: &SessionHandle) -> bool {
    handle
        .try_lock()
        .map(|session| session.phase() != SessionPhase::Ended)
        .unwrap_or(true)
}

/// Process-local session store
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(
        &self,
        session: Session,
        limit: Option<usize>,
    ) -> Result<SessionHandle, SessionLimitError> {
        let mut sessions = self.sessions.write().await;

        if let Some(max) = limit {
            let running = sessions.values().filter(|handle| is_running(handle)).count();
            if running >= max {
                return Err(SessionLimitError { max });
            }
            // Ended sessions stay readable until their slot is needed
            if sessions.len() >= max {
                let before = sessions.len();
                sessions.retain(|_, handle| is_running(handle));
                tracing::debug!(evicted = before - sessions.len(), "Evicted ended sessions");
            }
        }

        let id = session.id();
        let handle = Arc::new(Mutex::new(session));
        sessions.insert(id, handle.clone());
        Ok(handle)
    }

    async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        self.sessions.read().await.get(&id).cloned()
    }

    async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
