//! Pipeline metrics.
//!
//! Every record goes to the `metrics` facade (a no-op until an exporter is
//! installed) and to a structured log event.

use ::metrics::{counter, histogram};
use tracing::info;

use crate::metrics_enabled;

/// Metrics for the generation pipeline and its HTTP surface
pub struct PipelineMetrics;

impl PipelineMetrics {
    /// Record a finished generation request
    pub fn record_generation(outcome: &'static str, duration_ms: f64) {
        if metrics_enabled() {
            counter!("trellis_generations_total", 1, "outcome" => outcome);
            histogram!("trellis_generation_duration_ms", duration_ms, "outcome" => outcome);
        }
        info!(outcome, duration_ms, "Generation finished");
    }

    /// Record one oracle call
    pub fn record_oracle_call(stage: &'static str, duration_ms: f64, success: bool) {
        let status = if success { "ok" } else { "error" };
        if metrics_enabled() {
            counter!("trellis_oracle_calls_total", 1, "stage" => stage, "status" => status);
            histogram!("trellis_oracle_duration_ms", duration_ms, "stage" => stage);
        }
        info!(stage, duration_ms, success, "Oracle call");
    }

    /// Record a planner retry after unusable output
    pub fn record_retry(reason: &'static str) {
        if metrics_enabled() {
            counter!("trellis_planner_retries_total", 1, "reason" => reason);
        }
        info!(reason, "Planner retry");
    }

    /// Record a rollback attempt
    pub fn record_rollback(success: bool) {
        if metrics_enabled() {
            counter!("trellis_rollbacks_total", 1, "success" => if success { "true" } else { "false" });
        }
        info!(success, "Rollback");
    }

    /// Record a server-side render
    pub fn record_render(duration_ms: f64, success: bool) {
        if metrics_enabled() {
            counter!("trellis_renders_total", 1, "success" => if success { "true" } else { "false" });
            histogram!("trellis_render_duration_ms", duration_ms);
        }
        info!(duration_ms, success, "Render");
    }

    /// Record an HTTP request
    pub fn record_http_request(path: &str, method: &str, status_code: u16, duration_ms: f64) {
        if metrics_enabled() {
            counter!(
                "trellis_http_requests_total",
                1,
                "path" => path.to_string(),
                "method" => method.to_string(),
                "status" => status_code.to_string()
            );
            histogram!("trellis_http_duration_ms", duration_ms, "path" => path.to_string());
        }
        info!(path, method, status_code, duration_ms, "HTTP request");
    }
}
