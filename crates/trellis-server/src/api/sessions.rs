//! Generation and version-history endpoints

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use trellis_core::{GenerationOutcome, SessionId, SessionSnapshot};

use super::errors::ApiError;
use crate::server::TrellisServer;

const INVALID_VERSION_INDEX: &str = "Invalid version index";

fn session_id(raw: Option<String>) -> SessionId {
    raw.filter(|id| !id.is_empty())
        .map(SessionId)
        .unwrap_or_else(SessionId::default_session)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub session_id: Option<String>,
    pub prompt: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollbackRequest {
    pub session_id: Option<String>,
    pub version_index: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    pub session_id: Option<String>,
}

/// POST /api/generate
pub async fn generate(
    State(server): State<Arc<TrellisServer>>,
    request: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerationOutcome>, ApiError> {
    let Json(request) = request?;
    let id = session_id(request.session_id);
    let prompt = request.prompt.unwrap_or_default();

    let outcome = server.service().generate(&id, &prompt).await?;
    Ok(Json(outcome))
}

/// POST /api/rollback
pub async fn rollback(
    State(server): State<Arc<TrellisServer>>,
    request: Result<Json<RollbackRequest>, JsonRejection>,
) -> Result<Json<GenerationOutcome>, ApiError> {
    let Json(request) = request.map_err(|_| ApiError::BadRequest(INVALID_VERSION_INDEX.to_string()))?;
    let id = session_id(request.session_id);
    let index = request
        .version_index
        .ok_or_else(|| ApiError::BadRequest(INVALID_VERSION_INDEX.to_string()))?;

    let outcome = server.service().rollback(&id, index).await?;
    Ok(Json(outcome))
}

/// GET /api/versions
pub async fn versions(
    State(server): State<Arc<TrellisServer>>,
    query: Result<Query<SessionRequest>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query?;
    let versions = server.service().versions(&session_id(query.session_id)).await?;
    Ok(Json(json!({ "versions": versions })))
}

/// GET /api/session
pub async fn session(
    State(server): State<Arc<TrellisServer>>,
    query: Result<Query<SessionRequest>, QueryRejection>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let Query(query) = query?;
    let snapshot = server.service().snapshot(&session_id(query.session_id)).await?;
    Ok(Json(snapshot))
}

/// POST /api/reset; an empty body resets the default session
pub async fn reset(
    State(server): State<Arc<TrellisServer>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Value>, ApiError> {
    let body = body.map_err(|rejection| ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text())))?;
    let request = reset_request(&body)?;
    server.service().reset(&session_id(request.session_id)).await?;
    Ok(Json(json!({ "message": "Session reset" })))
}

/// A body that is present but unreadable is rejected rather than treated as
/// a request for the default session
fn reset_request(body: &[u8]) -> Result<SessionRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SessionRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))
}
