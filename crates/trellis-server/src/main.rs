use anyhow::{Context, Result};
use trellis_server::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenv::dotenv().ok();

    let config = ServerConfig::load();

    trellis_monitoring::init(config.monitoring_config()).context("Failed to initialize monitoring")?;

    trellis_server::run(config).await.context("Server error")?;

    Ok(())
}
