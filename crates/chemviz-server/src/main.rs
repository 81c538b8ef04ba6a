//! ChemVisualizer Server - Main entry point

use anyhow::Result;
use chemviz_common::logging::{init_logging, LogConfig};
use tracing::info;

use chemviz_server::{api, config::Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with configuration from environment
    let mut log_config = LogConfig::from_env()?.with_file_prefix("chemviz-server");
    if log_config.filter_directives.is_none() {
        log_config = log_config
            .with_filter_directives("chemviz_server=debug,tower_http=debug,axum=trace,sqlx=info");
    }

    init_logging(&log_config)?;

    info!("Starting ChemVisualizer Server");

    // Load configuration
    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    api::serve(config).await?;

    info!("Server shut down gracefully");

    Ok(())
}
