//! Error responses for the Trellis API
//!
//! Every error body carries `error` (a message safe to show users) and
//! `errorDetails`; parse failures add `raw`, invalid plans add `details`.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use trellis_core::{PipelineError, UpstreamKind};
use trellis_stdlib::RenderError;

/// API Error type for returning standard error responses
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),
    /// A pipeline failure, status chosen by category
    Pipeline(PipelineError),
    /// Program text that could not be rendered (422)
    Render(RenderError),
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        ApiError::Pipeline(err)
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        ApiError::Render(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(format!("Invalid query: {}", rejection.body_text()))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            ApiError::Pipeline(err) => write!(f, "Pipeline Error: {}", err),
            ApiError::Render(err) => write!(f, "Render Error: {}", err),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Render(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Pipeline(err) => match err {
                PipelineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                PipelineError::OracleParse { .. }
                | PipelineError::InvalidPlan { .. }
                | PipelineError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
                PipelineError::Upstream(kind) => upstream_status(*kind),
            },
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "ERR_BAD_REQUEST",
            ApiError::Pipeline(err) => err.error_code(),
            ApiError::Render(err) => err.error_code(),
        }
    }

    fn body(&self) -> Value {
        let message = match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Pipeline(PipelineError::Store(_)) => "Internal server error".to_string(),
            ApiError::Pipeline(err) => err.to_string(),
            ApiError::Render(err) => err.to_string(),
        };

        let mut body = json!({
            "error": message,
            "errorDetails": {
                "errorCode": self.error_code(),
                "errorMessage": message,
            }
        });

        match self {
            ApiError::Pipeline(PipelineError::OracleParse { raw }) => body["raw"] = json!(raw),
            ApiError::Pipeline(PipelineError::InvalidPlan { details }) => body["details"] = json!(details),
            _ => {}
        }
        body
    }
}

fn upstream_status(kind: UpstreamKind) -> StatusCode {
    match kind {
        UpstreamKind::RateLimited | UpstreamKind::QuotaExhausted => StatusCode::TOO_MANY_REQUESTS,
        UpstreamKind::Overloaded => StatusCode::SERVICE_UNAVAILABLE,
        UpstreamKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        UpstreamKind::Unavailable => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        if let ApiError::Pipeline(PipelineError::Store(err)) = &self {
            tracing::error!(error = %err, "Session store failure");
        }
        (self.status(), Json(self.body())).into_response()
    }
}
