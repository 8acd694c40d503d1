//!
//! Trellis Core - sessions, the oracle boundary and the generation pipeline
//!
//! A prompt travels through the planner oracle, plan validation (with one
//! corrective retry), deterministic compilation and the explainer oracle
//! before it is committed as a new version of its session.

#![forbid(unsafe_code)]

/// Domain layer - sessions, versions and the store boundary
pub mod domain;

/// Application services - prompts, guard and orchestration
pub mod application;

/// Error types
pub mod error;

/// Oracle boundary
pub mod oracle;

/// Test doubles
#[cfg(feature = "testing")]
pub mod testing;

pub use application::{GenerationConfig, GenerationOutcome, GenerationService};
pub use domain::repository::SessionStore;
pub use domain::session::{
    HistoryEntry, NewVersion, Role, Session, SessionId, SessionSnapshot, Version, VersionOutcome, VersionSummary,
};
pub use error::{CoreError, PipelineError, UpstreamKind};
pub use oracle::{OracleError, PlanOracle};

/// Returns the version of the trellis-core crate
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
