//! Create bovid command

use crate::features::bovids::types::{check_tag_ownership, BovidPayload};
use crate::features::shared::validation::FieldErrors;
use crate::models::{Bovid, UserId};
use crate::store::{HerdStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum CreateBovidError {
    #[error("Invalid bovid: {0}")]
    Validation(FieldErrors),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Validate the payload and insert the bovid with its tags
///
/// The owner is always `owner`; tag ids must all belong to the same user.
#[tracing::instrument(skip(store, payload))]
pub async fn handle(
    store: &dyn HerdStore,
    owner: UserId,
    payload: BovidPayload,
) -> Result<Bovid, CreateBovidError> {
    let (fields, mut errors) = payload.clean(None);
    check_tag_ownership(store, owner, &fields.tag_ids, &mut errors).await?;
    errors.into_result().map_err(CreateBovidError::Validation)?;

    let bovid = store.create_bovid(owner, fields).await?;

    tracing::info!(bovid_id = bovid.id, tags = bovid.tag_ids.len(), "Bovid created");

    Ok(bovid)
}
