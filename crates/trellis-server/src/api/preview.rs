//! Server-side preview and whitelist listing

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use trellis_monitoring::PipelineMetrics;
use trellis_stdlib::Rendered;

use super::errors::ApiError;
use crate::server::TrellisServer;

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub code: String,
}

/// POST /api/render: program text to render tree and HTML
pub async fn render(
    State(server): State<Arc<TrellisServer>>,
    request: Result<Json<RenderRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = request?;

    let started = Instant::now();
    let result = server.engine().render(&request.code);
    PipelineMetrics::record_render(started.elapsed().as_secs_f64() * 1000.0, result.is_ok());

    let body = match result? {
        Rendered::Empty => json!({ "empty": true, "tree": null, "html": "" }),
        Rendered::Tree(tree) => json!({ "empty": false, "html": tree.to_html(), "tree": tree }),
    };
    Ok(Json(body))
}

/// GET /api/components
pub async fn components(State(server): State<Arc<TrellisServer>>) -> Json<Value> {
    Json(json!({ "components": server.service().registry().components() }))
}
