//! Update bovid command (`PUT` and `PATCH`)

use crate::features::bovids::types::{check_tag_ownership, BovidPayload};
use crate::features::shared::validation::FieldErrors;
use crate::models::{Bovid, UserId};
use crate::store::{HerdStore, StoreError};

#[derive(Debug, Clone)]
pub struct UpdateBovidCommand {
    pub id: i64,
    pub payload: BovidPayload,
    /// `PATCH`: only the keys present in the payload change
    pub partial: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateBovidError {
    #[error("Bovid '{0}' not found")]
    NotFound(i64),

    #[error("Invalid bovid: {0}")]
    Validation(FieldErrors),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

#[tracing::instrument(skip(store, command), fields(id = command.id, partial = command.partial))]
pub async fn handle(
    store: &dyn HerdStore,
    owner: UserId,
    command: UpdateBovidCommand,
) -> Result<Bovid, UpdateBovidError> {
    let existing = store
        .get_bovid(owner, command.id)
        .await?
        .ok_or(UpdateBovidError::NotFound(command.id))?;

    let base = command.partial.then_some(&existing);
    let (fields, mut errors) = command.payload.clean(base);
    check_tag_ownership(store, owner, &fields.tag_ids, &mut errors).await?;
    errors.into_result().map_err(UpdateBovidError::Validation)?;

    let bovid = store
        .update_bovid(owner, command.id, fields)
        .await?
        .ok_or(UpdateBovidError::NotFound(command.id))?;

    tracing::info!(bovid_id = bovid.id, "Bovid updated");

    Ok(bovid)
}
