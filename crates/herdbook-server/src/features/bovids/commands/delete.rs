use crate::models::UserId;
use crate::storage::MediaStorage;
use crate::store::{HerdStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum DeleteBovidError {
    #[error("Bovid '{0}' not found")]
    NotFound(i64),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Delete a bovid; its tag links and life events go with it
///
/// The stored photo is removed afterwards. Failing to remove it is logged and
/// does not fail the request, since the row is already gone.
#[tracing::instrument(skip(store, media))]
pub async fn handle(
    store: &dyn HerdStore,
    media: &MediaStorage,
    owner: UserId,
    id: i64,
) -> Result<(), DeleteBovidError> {
    let removed = store
        .delete_bovid(owner, id)
        .await?
        .ok_or(DeleteBovidError::NotFound(id))?;

    if let Some(key) = removed.image.as_deref() {
        if let Err(e) = media.delete(key).await {
            tracing::warn!(key, error = %e, "Failed to remove image of deleted bovid");
        }
    }

    tracing::info!(bovid_id = id, "Bovid deleted");
    Ok(())
}
