//! Command implementations

pub mod migrate;
pub mod user;

use herdbook_server::config::{Config, DatabaseConfig};
use herdbook_server::db;
use herdbook_server::store::PgStore;

use crate::error::Result;

/// Pool settings for a one-shot admin command
pub(crate) fn database_config(database_url: &str) -> DatabaseConfig {
    DatabaseConfig {
        url: database_url.to_string(),
        max_connections: 1,
        min_connections: 0,
        ..Config::default().database
    }
}

/// Connect to `database_url`, applying any pending migrations first
pub(crate) async fn connect(database_url: &str) -> Result<PgStore> {
    let store = db::connect_store(&database_config(database_url)).await?;
    Ok(store)
}
