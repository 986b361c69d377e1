//! Herdbook Server Library
//!
//! Livestock record keeping over HTTP: users register animals ("bovids"),
//! label them with tags, log life events against them and attach a photo.
//!
//! # Architecture
//!
//! - **features**: vertical slices (tags, bovids, events, users), each split
//!   into commands (writes) and queries (reads) with its own routes
//! - **store**: the [`store::HerdStore`] repository trait with a Postgres
//!   backend and an in-memory backend
//! - **storage**: media storage for uploaded images (local disk or S3)
//! - **auth**: token authentication and password hashing
//!
//! Every resource row belongs to exactly one user. Handlers resolve the
//! caller with [`auth::AuthUser`] and pass its id to every store call, so
//! rows of other users are never visible and answer 404.
//!
//! # Example
//!
//! ```no_run
//! use herdbook_server::{api, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     api::serve(config).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;
pub mod models;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use error::AppError;
pub use store::{HerdStore, MemoryStore, PgStore, SharedStore, StoreError};
