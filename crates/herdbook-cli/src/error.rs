//! Error types for the Herdbook CLI
//!
//! Messages are user-facing and say what to check next.

use herdbook_server::db::DbError;
use herdbook_server::store::StoreError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// Connecting or migrating failed
    #[error("{0}")]
    Database(#[from] DbError),

    #[error("Database error: {0}. Check that migrations have been applied ('herdbook migrate').")]
    Store(#[from] StoreError),

    /// Input rejected by the account validators
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("No user with email '{0}'. Check the address or create the user first.")]
    UserNotFound(String),

    /// Password prompt failed or was cancelled
    #[error("Prompt failed: {0}")]
    Prompt(#[from] inquire::InquireError),

    /// Anything that should not happen during normal operation
    #[error("{0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_not_found_message() {
        let err = CliError::UserNotFound("a@farm.io".to_string());
        assert!(err.to_string().contains("'a@farm.io'"));
    }
}
