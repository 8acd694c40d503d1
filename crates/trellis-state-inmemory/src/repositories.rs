use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use trellis_core::{
    CoreError, NewVersion, Session, SessionId, SessionSnapshot, SessionStore, VersionOutcome, VersionSummary,
};

/// Shared storage for sessions
pub type SessionMap = Arc<RwLock<HashMap<SessionId, Session>>>;

/// In-memory implementation of the SessionStore
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: SessionMap,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store over an existing map, e.g. one shared with another store handle
    pub fn with_sessions(sessions: SessionMap) -> Self {
        Self { sessions }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn contains(&self, id: &SessionId) -> bool {
        self.sessions.read().await.contains_key(id)
    }

    /// Run `f` on the session, creating it first when needed
    async fn with_session<T>(&self, id: &SessionId, f: impl FnOnce(&mut Session) -> T) -> T {
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(id.clone()).or_insert_with(|| {
            debug!(session_id = %id, "Creating session");
            Session::new(id.clone())
        });
        f(session)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_or_create(&self, id: &SessionId) -> Result<Session, CoreError> {
        if let Some(session) = self.sessions.read().await.get(id) {
            return Ok(session.clone());
        }
        Ok(self.with_session(id, |session| session.clone()).await)
    }

    async fn commit(&self, id: &SessionId, new_version: NewVersion) -> Result<VersionOutcome, CoreError> {
        let outcome = self.with_session(id, |session| session.commit(new_version)).await;
        debug!(session_id = %id, version_index = outcome.version.index, "Committed version");
        Ok(outcome)
    }

    async fn rollback(&self, id: &SessionId, index: i64) -> Result<VersionOutcome, CoreError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(id) {
            Some(session) => session.rollback(index),
            None => Err(CoreError::VersionOutOfRange { index, total: 0 }),
        }
    }

    async fn reset(&self, id: &SessionId) -> Result<(), CoreError> {
        let removed = self.sessions.write().await.remove(id).is_some();
        debug!(session_id = %id, removed, "Reset session");
        Ok(())
    }

    async fn summarize(&self, id: &SessionId) -> Result<Vec<VersionSummary>, CoreError> {
        Ok(self.with_session(id, |session| session.summarize()).await)
    }

    async fn snapshot(&self, id: &SessionId) -> Result<SessionSnapshot, CoreError> {
        Ok(self.with_session(id, |session| session.snapshot()).await)
    }
}
