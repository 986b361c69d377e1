//! Herdbook Server - Main entry point

use anyhow::Result;
use herdbook_common::logging::{init_logging, LogConfig};
use tracing::info;

use herdbook_server::{api, config::Config};

#[tokio::main]
async fn main() -> Result<()> {
    let log_config = LogConfig::builder()
        .log_file_prefix("herdbook-server")
        .filter_directives("herdbook_server=debug,tower_http=debug,sqlx=info")
        .build();

    // Environment variables take precedence
    let log_config = log_config.merge_env()?;

    let _guard = init_logging(&log_config)?;

    info!("Starting Herdbook Server");

    let config = Config::load()?;
    info!(
        store = ?config.store,
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    api::serve(config).await
}
