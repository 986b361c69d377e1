//! Postgres connection pool

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use thiserror::Error;

use crate::config::DatabaseConfig;
use crate::store::PgStore;

/// Errors raised while connecting to the database or migrating it
#[derive(Error, Debug)]
pub enum DbError {
    /// SQL query or connection error
    #[error("Database connection failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Database configuration is invalid or missing
    #[error("Database configuration error: {0}. Check DATABASE_URL and connection settings.")]
    Config(String),
}

pub type DbResult<T> = Result<T, DbError>;

fn pool_options(config: &DatabaseConfig) -> DbResult<PgPoolOptions> {
    if config.min_connections > config.max_connections {
        return Err(DbError::Config(format!(
            "min_connections ({}) exceeds max_connections ({})",
            config.min_connections, config.max_connections
        )));
    }

    Ok(PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs)))
}

pub async fn create_pool(config: &DatabaseConfig) -> DbResult<PgPool> {
    let pool = pool_options(config)?.connect(&config.url).await?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database connection pool created"
    );

    Ok(pool)
}

/// Connect and bring the schema up to date
pub async fn connect_store(config: &DatabaseConfig) -> DbResult<PgStore> {
    let store = PgStore::new(create_pool(config).await?);
    store.migrate().await?;
    tracing::info!("Database migrations completed");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(min: u32, max: u32) -> DatabaseConfig {
        DatabaseConfig {
            url: "postgresql://localhost/herdbook".to_string(),
            max_connections: max,
            min_connections: min,
            connect_timeout_secs: 10,
            idle_timeout_secs: 600,
        }
    }

    #[test]
    fn test_pool_options_accept_valid_bounds() {
        assert!(pool_options(&config(2, 10)).is_ok());
    }

    #[test]
    fn test_pool_options_reject_inverted_bounds() {
        assert!(matches!(pool_options(&config(20, 10)), Err(DbError::Config(_))));
    }
}
