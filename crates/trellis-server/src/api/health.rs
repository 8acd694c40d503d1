use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::server::TrellisServer;

/// GET /api/health
pub async fn health_check(State(server): State<Arc<TrellisServer>>) -> Json<Value> {
    debug!("Health check requested");
    Json(json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION"),
        "oracle": server.oracle_name(),
        "components": server.service().registry().len(),
    }))
}
