//! Logging and metrics for the Trellis services.

use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

pub mod logging;
pub mod metrics;

pub use crate::logging::init_logging;
pub use crate::metrics::PipelineMetrics;

static METRICS_ENABLED: AtomicBool = AtomicBool::new(true);

/// Configuration for initializing monitoring
#[derive(Debug, Clone)]
pub struct MonitoringConfig {
    /// Service name attached to the startup events
    pub service_name: String,
    /// Log level filter (e.g., "info,trellis_core=debug")
    pub log_filter: String,
    /// Emit JSON instead of pretty logs
    pub json_logs: bool,
    /// Record metrics through the `metrics` facade
    pub enable_metrics: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            service_name: "trellis".to_string(),
            log_filter: "info".to_string(),
            json_logs: false,
            enable_metrics: true,
        }
    }
}

/// Initialize logging and the metrics switch. Call once at process start.
pub fn init(config: MonitoringConfig) -> anyhow::Result<()> {
    init_logging(&config)?;
    set_metrics_enabled(config.enable_metrics);

    info!(enable_metrics = config.enable_metrics, "Monitoring initialized");
    Ok(())
}

/// Turn metric recording on or off; structured log events are unaffected
pub fn set_metrics_enabled(enabled: bool) {
    METRICS_ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn metrics_enabled() -> bool {
    METRICS_ENABLED.load(Ordering::Relaxed)
}
