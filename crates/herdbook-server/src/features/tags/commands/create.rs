//! Create tag command

use serde::Deserialize;

use crate::features::shared::fields::Field;
use crate::features::shared::validation::{clean_required, FieldErrors};
use crate::models::{Tag, UserId};
use crate::store::{HerdStore, StoreError};

pub const TAG_NAME_MAX_LENGTH: usize = 255;

/// Request body for `POST /cattle/tags`
///
/// Any owner field in the body is ignored; the tag always belongs to the caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTagCommand {
    #[serde(default)]
    pub name: Field<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateTagError {
    #[error("Invalid tag: {0}")]
    Validation(FieldErrors),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl CreateTagCommand {
    /// Returns the cleaned tag name
    pub fn validate(self) -> Result<String, CreateTagError> {
        let mut errors = FieldErrors::new();
        let name = clean_required(&mut errors, "name", self.name, TAG_NAME_MAX_LENGTH);
        errors.into_result().map_err(CreateTagError::Validation)?;
        Ok(name)
    }
}

#[tracing::instrument(skip(store, command))]
pub async fn handle(
    store: &dyn HerdStore,
    owner: UserId,
    command: CreateTagCommand,
) -> Result<Tag, CreateTagError> {
    let name = command.validate()?;

    let tag = store.create_tag(owner, &name).await?;
    tracing::info!(tag_id = tag.id, "Tag created");

    Ok(tag)
}
