//! The boundary to the external language model.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Failures of a single oracle call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// The request failed or the service answered with an error status
    #[error("Oracle transport error: {0}")]
    Transport(String),

    /// No answer within the configured bound
    #[error("Oracle call timed out after {0:?}")]
    Timeout(Duration),

    /// The oracle client is not usable (missing key, bad endpoint)
    #[error("Oracle is not configured: {0}")]
    Configuration(String),
}

/// Proposes text for a pair of system instructions and request context.
///
/// The planner and explainer stages both go through this trait; they only
/// differ in the instructions passed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlanOracle: Send + Sync {
    /// Ask the oracle and return its raw text answer
    async fn propose(&self, system_instructions: &str, context: &str) -> Result<String, OracleError>;
}
