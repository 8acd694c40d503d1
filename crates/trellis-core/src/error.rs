use thiserror::Error;

use crate::oracle::OracleError;

/// Errors raised by the session domain and its stores
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Rollback target outside `0..total`
    #[error("Version index {index} is out of range (session has {total} versions)")]
    VersionOutOfRange {
        /// Requested index
        index: i64,
        /// Number of versions in the session
        total: usize,
    },

    /// Session store failure
    #[error("State store error: {0}")]
    StateStoreError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::SerializationError(err.to_string())
    }
}

impl From<String> for CoreError {
    fn from(err: String) -> Self {
        CoreError::Other(err)
    }
}

/// Stable categories for failures of the external oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamKind {
    /// Too many requests
    RateLimited,
    /// The service is overloaded
    Overloaded,
    /// The account quota is used up
    QuotaExhausted,
    /// The call did not complete in time
    Timeout,
    /// Any other transport or service failure
    Unavailable,
}

impl UpstreamKind {
    /// Classify an oracle failure. Markers are checked in a fixed order, so
    /// "429 ... quota" is rate limiting, not quota exhaustion.
    pub fn classify(err: &OracleError) -> Self {
        let text = match err {
            OracleError::Timeout(_) => return UpstreamKind::Timeout,
            OracleError::Transport(text) | OracleError::Configuration(text) => text,
        };

        if text.contains("429") || text.contains("Too Many Requests") {
            UpstreamKind::RateLimited
        } else if text.contains("503") || text.contains("Service Unavailable") {
            UpstreamKind::Overloaded
        } else if text.contains("quota") || text.contains("limit") {
            UpstreamKind::QuotaExhausted
        } else {
            UpstreamKind::Unavailable
        }
    }

    /// User-facing message; never contains transport details
    pub fn message(&self) -> &'static str {
        match self {
            UpstreamKind::RateLimited => "⚠️ AI Usage Limit Reached. Please wait a moment and try again.",
            UpstreamKind::Overloaded => "⚠️ AI Service is currently overloaded. Please try again later.",
            UpstreamKind::QuotaExhausted => "⚠️ API Quota Exhausted. Please check your plan or try again later.",
            UpstreamKind::Timeout => "⚠️ The AI service took too long to respond. Please try again.",
            UpstreamKind::Unavailable => "⚠️ The AI service could not be reached. Please try again later.",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamKind::RateLimited => "rate_limited",
            UpstreamKind::Overloaded => "overloaded",
            UpstreamKind::QuotaExhausted => "quota_exhausted",
            UpstreamKind::Timeout => "timeout",
            UpstreamKind::Unavailable => "unavailable",
        }
    }
}

/// Failures of a pipeline request, in user-facing categories
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// The request was rejected before any oracle call
    #[error("{0}")]
    InvalidInput(String),

    /// The oracle's output could not be parsed, even after the retry
    #[error("The AI returned invalid JSON. Please try rephrasing your request.")]
    OracleParse {
        /// Final oracle output, fences stripped
        raw: String,
    },

    /// The oracle's plan violated the whitelist, even after the retry
    #[error("AI could not produce a valid plan.")]
    InvalidPlan {
        /// One message per violation
        details: Vec<String>,
    },

    /// The oracle could not be reached or refused the call
    #[error("{}", .0.message())]
    Upstream(UpstreamKind),

    /// The session store failed
    #[error("Session store failure: {0}")]
    Store(CoreError),
}

impl PipelineError {
    pub fn error_code(&self) -> &'static str {
        match self {
            PipelineError::InvalidInput(_) => "ERR_INVALID_INPUT",
            PipelineError::OracleParse { .. } => "ERR_ORACLE_PARSE",
            PipelineError::InvalidPlan { .. } => "ERR_PLAN_VALIDATION",
            PipelineError::Upstream(_) => "ERR_UPSTREAM_SERVICE",
            PipelineError::Store(_) => "ERR_STATE_STORE",
        }
    }

    /// Short outcome label for metrics
    pub fn outcome(&self) -> &'static str {
        match self {
            PipelineError::InvalidInput(_) => "invalid_input",
            PipelineError::OracleParse { .. } => "oracle_parse",
            PipelineError::InvalidPlan { .. } => "invalid_plan",
            PipelineError::Upstream(kind) => kind.as_str(),
            PipelineError::Store(_) => "store",
        }
    }
}

impl From<CoreError> for PipelineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::VersionOutOfRange { .. } => PipelineError::InvalidInput("Invalid version index".to_string()),
            other => PipelineError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_error_display() {
        let errors = vec![
            (
                CoreError::VersionOutOfRange { index: 5, total: 2 },
                "Version index 5 is out of range (session has 2 versions)",
            ),
            (CoreError::StateStoreError("db".to_string()), "State store error: db"),
            (CoreError::Other("other".to_string()), "other"),
        ];
        for (error, expected) in errors {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_upstream_classification_order() {
        let transport = |text: &str| OracleError::Transport(text.to_string());
        let cases = vec![
            (transport("HTTP 429: quota exceeded"), UpstreamKind::RateLimited),
            (transport("Too Many Requests"), UpstreamKind::RateLimited),
            (transport("HTTP 503 Service Unavailable"), UpstreamKind::Overloaded),
            (transport("daily limit hit"), UpstreamKind::QuotaExhausted),
            (transport("quota"), UpstreamKind::QuotaExhausted),
            (transport("connection refused"), UpstreamKind::Unavailable),
            (OracleError::Timeout(Duration::from_secs(1)), UpstreamKind::Timeout),
        ];
        for (err, expected) in cases {
            assert_eq!(UpstreamKind::classify(&err), expected, "{}", err);
        }
    }

    #[test]
    fn test_pipeline_error_never_leaks_transport_text() {
        let kind = UpstreamKind::classify(&OracleError::Transport("HTTP 500: secret-key-123 stack".to_string()));
        let err = PipelineError::Upstream(kind);
        assert!(!err.to_string().contains("secret"));
        assert_eq!(err.error_code(), "ERR_UPSTREAM_SERVICE");
    }

    #[test]
    fn test_out_of_range_maps_to_invalid_input() {
        let err: PipelineError = CoreError::VersionOutOfRange { index: -1, total: 0 }.into();
        assert_eq!(err, PipelineError::InvalidInput("Invalid version index".to_string()));
    }
}
