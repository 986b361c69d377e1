//! Herdbook Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling and logging for the Herdbook workspace.
//!
//! - **Error Handling**: [`HerdbookError`] and the [`Result`] alias
//! - **Logging**: [`logging::LogConfig`] and [`logging::init_logging`]
//!
//! # Example
//!
//! ```no_run
//! use herdbook_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> herdbook_common::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     let _guard = init_logging(&config)?;
//!     tracing::info!("Herd is ready");
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

pub use error::{HerdbookError, Result};
