//! Feature modules implementing the Herdbook API
//!
//! Each feature is a vertical slice with its own commands, queries and
//! routes.
//!
//! # Features
//!
//! - **tags**: user-defined labels
//! - **bovids**: animal records, tag filtering and photo upload
//! - **events**: dated life events per bovid
//! - **users**: registration, tokens and the caller's profile
//!
//! # Architecture
//!
//! Each feature module follows the structure:
//! - `commands/` - Write operations (create, update, delete)
//! - `queries/` - Read operations (get, list)
//! - `routes.rs` - HTTP route definitions
//! - `types.rs` - Request and response shapes (if needed)
//!
//! Every command and query takes the caller's id; nothing reads or writes
//! rows of another user.

pub mod bovids;
pub mod events;
pub mod shared;
pub mod tags;
pub mod users;

use axum::{extract::DefaultBodyLimit, extract::FromRef, Router};

use crate::storage::MediaStorage;
use crate::store::SharedStore;

/// Shared state for all feature routes
#[derive(Clone, FromRef)]
pub struct FeatureState {
    /// Repository backend
    pub store: SharedStore,
    /// Where uploaded images live
    pub media: MediaStorage,
}

/// Creates the API router with all feature routes mounted
///
/// - `/cattle/tags` - Tags
/// - `/cattle/bovids` - Bovids and image upload
/// - `/cattle/events` - Life events
/// - `/users` - Accounts and tokens
pub fn router(state: FeatureState) -> Router<()> {
    let upload_limit = state.media.config().max_upload_bytes;

    let cattle = Router::new()
        .nest("/tags", tags::tags_routes())
        .nest("/bovids", bovids::bovids_routes())
        .nest("/events", events::events_routes());

    Router::new()
        .nest("/cattle", cattle)
        .nest("/users", users::users_routes())
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
