//! Error types shared across Herdbook crates

use thiserror::Error;

/// Result type alias for shared operations
pub type Result<T> = std::result::Result<T, HerdbookError>;

/// Errors raised outside the HTTP layer (startup, logging, CLI plumbing)
#[derive(Error, Debug)]
pub enum HerdbookError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Logging initialization failed: {0}")]
    Logging(String),
}

impl HerdbookError {
    /// Shorthand for a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
