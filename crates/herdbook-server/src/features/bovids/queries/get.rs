use crate::models::{Bovid, Tag, UserId};
use crate::store::{HerdStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum GetBovidError {
    #[error("Bovid '{0}' not found")]
    NotFound(i64),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// A bovid of `owner` together with its expanded tags
#[tracing::instrument(skip(store))]
pub async fn handle(
    store: &dyn HerdStore,
    owner: UserId,
    id: i64,
) -> Result<(Bovid, Vec<Tag>), GetBovidError> {
    let bovid = store
        .get_bovid(owner, id)
        .await?
        .ok_or(GetBovidError::NotFound(id))?;

    let tags = store.find_tags(owner, &bovid.tag_ids).await?;

    Ok((bovid, tags))
}
