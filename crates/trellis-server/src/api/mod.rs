//! API routes for the Trellis server

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, MatchedPath, Request},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info_span;
use trellis_monitoring::PipelineMetrics;
use uuid::Uuid;

pub mod errors;
pub mod health;
pub mod preview;
pub mod sessions;

use crate::server::TrellisServer;

/// Build the router for API endpoints
pub fn build_router(server: Arc<TrellisServer>) -> Router {
    let max_body_bytes = server.config.max_body_bytes;

    Router::new()
        // Generation and history
        .route("/api/generate", post(sessions::generate))
        .route("/api/rollback", post(sessions::rollback))
        .route("/api/versions", get(sessions::versions))
        .route("/api/session", get(sessions::session))
        .route("/api/reset", post(sessions::reset))
        // Preview and whitelist
        .route("/api/render", post(preview::render))
        .route("/api/components", get(preview::components))
        // Health check
        .route("/api/health", get(health::health_check))
        .layer(middleware::from_fn(track_metrics))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let request_id = Uuid::new_v4();
            info_span!(
                "request",
                %request_id,
                method = %request.method(),
                uri = %request.uri(),
            )
        }))
        .with_state(server)
}

/// Record duration and status of every request
async fn track_metrics(request: Request, next: Next) -> Response {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let method = request.method().to_string();

    let started = Instant::now();
    let response = next.run(request).await;
    PipelineMetrics::record_http_request(
        &path,
        &method,
        response.status().as_u16(),
        started.elapsed().as_secs_f64() * 1000.0,
    );
    response
}
