//! Ownership-scoped repository
//!
//! Every operation on tags, bovids and life events takes the caller's
//! [`UserId`] and only ever reads or writes rows owned by that user. Rows of
//! other users behave exactly like rows that do not exist, so handlers can map
//! `None` straight to 404 without leaking existence.
//!
//! Two backends implement [`HerdStore`]:
//!
//! - [`PgStore`]: PostgreSQL via sqlx, used in production
//! - [`MemoryStore`]: in-process maps behind a `tokio::sync::RwLock`, used by
//!   the HTTP test-suite and for local development without a database

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::models::{
    Bovid, BovidFields, LifeEvent, NewLifeEvent, NewUser, Tag, User, UserChanges, UserId,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Repository errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Row vanished between lookup and write
    #[error("{0}")]
    NotFound(String),

    /// Unique constraint violation
    #[error("{0}")]
    Conflict(String),
}

impl StoreError {
    pub fn not_found(resource_type: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{} '{}' not found", resource_type, id))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Shared handle stored in the router state
pub type SharedStore = Arc<dyn HerdStore>;

/// Filter for listing tags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagFilter {
    /// Only tags attached to at least one of the owner's bovids, each once
    pub assigned_only: bool,
}

/// Filter for listing bovids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BovidFilter {
    /// Keep bovids whose tag set intersects these ids
    pub tag_ids: Option<Vec<i64>>,
}

/// Filter for listing life events
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub bovid_id: Option<i64>,
}

/// Persistence boundary for the whole service
///
/// Ordering contract: tags by name descending (id descending on ties),
/// bovids by id descending, life events by id ascending.
#[async_trait]
pub trait HerdStore: Send + Sync + 'static {
    /// Short backend name for health output
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> StoreResult<()>;

    // ------------------------------------------------------------------ users

    /// Fails with [`StoreError::Conflict`] when the email is taken
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn find_user_by_token(&self, key: &str) -> StoreResult<Option<User>>;

    async fn update_user(&self, id: UserId, changes: UserChanges) -> StoreResult<User>;

    /// Return the user's existing token key, or persist `candidate` as the key
    async fn get_or_create_token(&self, id: UserId, candidate: &str) -> StoreResult<String>;

    // ------------------------------------------------------------------- tags

    async fn list_tags(&self, owner: UserId, filter: TagFilter) -> StoreResult<Vec<Tag>>;

    async fn create_tag(&self, owner: UserId, name: &str) -> StoreResult<Tag>;

    /// The subset of `ids` owned by `owner`, ordered by id
    async fn find_tags(&self, owner: UserId, ids: &[i64]) -> StoreResult<Vec<Tag>>;

    // ----------------------------------------------------------------- bovids

    async fn list_bovids(&self, owner: UserId, filter: &BovidFilter) -> StoreResult<Vec<Bovid>>;

    async fn get_bovid(&self, owner: UserId, id: i64) -> StoreResult<Option<Bovid>>;

    /// Insert the row and its tag links atomically; unowned tag ids are skipped
    async fn create_bovid(&self, owner: UserId, fields: BovidFields) -> StoreResult<Bovid>;

    /// Overwrite all writable columns and replace the tag set atomically
    async fn update_bovid(
        &self,
        owner: UserId,
        id: i64,
        fields: BovidFields,
    ) -> StoreResult<Option<Bovid>>;

    async fn set_bovid_image(
        &self,
        owner: UserId,
        id: i64,
        image: Option<String>,
    ) -> StoreResult<Option<Bovid>>;

    /// Delete the bovid with its tag links and life events; returns the removed row
    async fn delete_bovid(&self, owner: UserId, id: i64) -> StoreResult<Option<Bovid>>;

    // ------------------------------------------------------------ life events

    async fn list_events(&self, owner: UserId, filter: EventFilter) -> StoreResult<Vec<LifeEvent>>;

    /// `NotFound` when `event.bovid_id` is not a bovid of `owner`
    async fn create_event(&self, owner: UserId, event: NewLifeEvent) -> StoreResult<LifeEvent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = StoreError::not_found("Bovid", 42);
        assert_eq!(err.to_string(), "Bovid '42' not found");
    }

    #[test]
    fn test_filters_default_to_unfiltered() {
        assert!(!TagFilter::default().assigned_only);
        assert!(BovidFilter::default().tag_ids.is_none());
        assert!(EventFilter::default().bovid_id.is_none());
    }
}
