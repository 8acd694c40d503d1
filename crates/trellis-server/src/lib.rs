//!
//! Trellis Server - HTTP adapter for the Trellis generation pipeline
//!
//! Exposes generation, version history and session endpoints, plus a
//! server-side preview that renders compiled programs without a browser.

/// API module
pub mod api;

/// Configuration module
pub mod config;

/// Error module
pub mod error;

/// Gemini oracle client
pub mod gemini;

/// Server module
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use gemini::GeminiOracle;
pub use server::TrellisServer;

/// Run the server with the in-memory store and the Gemini oracle
pub async fn run(config: ServerConfig) -> ServerResult<()> {
    tracing::info!(
        port = config.port,
        model = %config.gemini_model,
        strict_props = config.strict_prop_validation,
        "Starting Trellis server"
    );
    TrellisServer::from_config(config)?.run().await
}
