//! Storage boundary for sessions.
//!
//! The pipeline only sees this trait, so tests run against isolated stores
//! and a persistent implementation can be swapped in without touching it.

use async_trait::async_trait;

use super::session::{NewVersion, Session, SessionId, SessionSnapshot, VersionOutcome, VersionSummary};
use crate::CoreError;

/// Keyed session storage
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Get a session, creating an empty one on first access
    async fn get_or_create(&self, id: &SessionId) -> Result<Session, CoreError>;

    /// Append a version to the session and make it live
    async fn commit(&self, id: &SessionId, new_version: NewVersion) -> Result<VersionOutcome, CoreError>;

    /// Make an existing version live. An unknown session is not created.
    async fn rollback(&self, id: &SessionId, index: i64) -> Result<VersionOutcome, CoreError>;

    /// Remove the session; removing an unknown session succeeds
    async fn reset(&self, id: &SessionId) -> Result<(), CoreError>;

    /// Version listing, oldest first
    async fn summarize(&self, id: &SessionId) -> Result<Vec<VersionSummary>, CoreError>;

    /// Client view of the session
    async fn snapshot(&self, id: &SessionId) -> Result<SessionSnapshot, CoreError>;
}
