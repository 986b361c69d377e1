use serde::Deserialize;

use crate::features::shared::validation::FieldErrors;
use crate::models::{Tag, UserId};
use crate::store::{HerdStore, StoreError, TagFilter};

/// Query string for `GET /cattle/tags`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListTagsQuery {
    /// `1` restricts the list to tags attached to at least one bovid
    pub assigned_only: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListTagsError {
    #[error("Invalid query: {0}")]
    Validation(FieldErrors),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Integer flags as well as `true`/`false`; blank means off
fn parse_flag(raw: &str) -> Option<bool> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(false);
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n != 0);
    }
    match raw.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

impl ListTagsQuery {
    pub fn filter(&self) -> Result<TagFilter, ListTagsError> {
        let assigned_only = match self.assigned_only.as_deref() {
            None => false,
            Some(raw) => parse_flag(raw).ok_or_else(|| {
                ListTagsError::Validation(FieldErrors::single(
                    "assigned_only",
                    "Must be a valid boolean.",
                ))
            })?,
        };
        Ok(TagFilter { assigned_only })
    }
}

#[tracing::instrument(skip(store))]
pub async fn handle(
    store: &dyn HerdStore,
    owner: UserId,
    query: ListTagsQuery,
) -> Result<Vec<Tag>, ListTagsError> {
    let filter = query.filter()?;
    let tags = store.list_tags(owner, filter).await?;
    Ok(tags)
}
