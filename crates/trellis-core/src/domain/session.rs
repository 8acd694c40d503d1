use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use trellis_dsl::{CompiledArtifact, Plan};

use crate::CoreError;

/// Session ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// The session used when a request names none
    pub fn default_session() -> Self {
        SessionId("default".to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        SessionId(id.to_string())
    }
}

/// Speaker of a history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

/// One conversation turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub content: String,
}

impl HistoryEntry {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// An immutable result of one successful generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub index: usize,
    pub plan: Plan,
    pub code: String,
    pub used_components: Vec<String>,
    pub explanation: String,
    pub prompt: String,
    pub timestamp: DateTime<Utc>,
}

/// Listing entry for a version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSummary {
    pub index: usize,
    pub prompt: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&Version> for VersionSummary {
    fn from(version: &Version) -> Self {
        Self {
            index: version.index,
            prompt: version.prompt.clone(),
            timestamp: version.timestamp,
        }
    }
}

/// Everything a commit needs besides the session
#[derive(Debug, Clone)]
pub struct NewVersion {
    pub plan: Plan,
    pub artifact: CompiledArtifact,
    pub explanation: String,
    pub prompt: String,
}

/// The version a commit or rollback landed on
#[derive(Debug, Clone, PartialEq)]
pub struct VersionOutcome {
    pub version: Version,
    pub total_versions: usize,
}

/// Read-only view of a session for clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub history: Vec<HistoryEntry>,
    /// Code of the live version, or empty
    pub code: String,
    pub versions: Vec<VersionSummary>,
    /// The live version, or -1 when there is none
    pub current_version_index: i64,
}

/// Aggregate: a conversation and its version history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub history: Vec<HistoryEntry>,
    pub versions: Vec<Version>,
    /// Plan that the next generation modifies
    pub live_plan: Option<Plan>,
    pub live_version: Option<usize>,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            history: Vec::new(),
            versions: Vec::new(),
            live_plan: None,
            live_version: None,
        }
    }

    /// Whether the next generation modifies an existing plan
    pub fn is_modification(&self) -> bool {
        self.live_plan.is_some()
    }

    /// Append a version and make it live.
    ///
    /// Versions are append-only: committing after a rollback adds a new
    /// version at the end rather than discarding the ones after the live one.
    pub fn commit(&mut self, new_version: NewVersion) -> VersionOutcome {
        let index = self.versions.len();
        let version = Version {
            index,
            plan: new_version.plan,
            code: new_version.artifact.code,
            used_components: new_version.artifact.used_components,
            explanation: new_version.explanation,
            prompt: new_version.prompt,
            timestamp: Utc::now(),
        };

        self.history.push(HistoryEntry::new(Role::User, version.prompt.clone()));
        self.history.push(HistoryEntry::new(
            Role::Assistant,
            format!("Generated UI based on: \"{}\"", version.prompt),
        ));
        self.live_plan = Some(version.plan.clone());
        self.live_version = Some(index);
        self.versions.push(version.clone());

        VersionOutcome {
            version,
            total_versions: self.versions.len(),
        }
    }

    /// Make an earlier version live again; leaves the session untouched on error
    pub fn rollback(&mut self, index: i64) -> Result<VersionOutcome, CoreError> {
        let total = self.versions.len();
        let version = usize::try_from(index)
            .ok()
            .and_then(|i| self.versions.get(i))
            .cloned()
            .ok_or(CoreError::VersionOutOfRange { index, total })?;

        self.live_plan = Some(version.plan.clone());
        self.live_version = Some(version.index);

        Ok(VersionOutcome {
            version,
            total_versions: total,
        })
    }

    pub fn summarize(&self) -> Vec<VersionSummary> {
        self.versions.iter().map(VersionSummary::from).collect()
    }

    /// Code and index both describe the live version
    pub fn snapshot(&self) -> SessionSnapshot {
        let live = self.live_version.and_then(|i| self.versions.get(i));
        SessionSnapshot {
            history: self.history.clone(),
            code: live.map(|v| v.code.clone()).unwrap_or_default(),
            versions: self.summarize(),
            current_version_index: live.map(|v| v.index as i64).unwrap_or(-1),
        }
    }
}
