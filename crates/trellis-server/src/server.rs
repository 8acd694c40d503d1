//! Main Trellis server implementation

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use trellis_core::{GenerationService, PlanOracle, SessionStore};
use trellis_state_inmemory::InMemorySessionStore;
use trellis_stdlib::RenderEngine;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::gemini::GeminiOracle;

/// Shared state behind every route
pub struct TrellisServer {
    /// Configuration
    pub config: ServerConfig,

    /// Generation pipeline
    service: GenerationService,

    /// Engine for server-side previews
    engine: RenderEngine,

    /// Name of the oracle backing the pipeline, for health output
    oracle_name: String,
}

impl std::fmt::Debug for TrellisServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrellisServer")
            .field("config", &self.config)
            .field("oracle", &self.oracle_name)
            .finish()
    }
}

impl TrellisServer {
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn SessionStore>,
        oracle: Arc<dyn PlanOracle>,
        oracle_name: impl Into<String>,
    ) -> Self {
        let service = GenerationService::new(store, oracle, config.generation_config());
        let engine = RenderEngine::with_library(trellis_stdlib::library(), service.registry());
        Self {
            config,
            service,
            engine,
            oracle_name: oracle_name.into(),
        }
    }

    /// Server with the in-memory store and the Gemini oracle
    pub fn from_config(config: ServerConfig) -> ServerResult<Self> {
        let oracle = GeminiOracle::from_config(&config)?;
        let oracle_name = format!("gemini:{}", oracle.model());
        Ok(Self::new(config, Arc::new(InMemorySessionStore::new()), Arc::new(oracle), oracle_name))
    }

    pub fn service(&self) -> &GenerationService {
        &self.service
    }

    pub fn engine(&self) -> &RenderEngine {
        &self.engine
    }

    pub fn oracle_name(&self) -> &str {
        &self.oracle_name
    }

    /// Bind and serve until Ctrl-C or SIGTERM
    pub async fn run(self) -> ServerResult<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.bind_address, self.config.port)
            .parse()
            .map_err(|e| ServerError::ConfigError(format!("Invalid bind address: {}", e)))?;

        let app = crate::api::build_router(Arc::new(self));

        let listener = TcpListener::bind(addr).await?;
        info!("Listening on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
