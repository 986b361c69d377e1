//! Upload bovid image command

use crate::features::bovids::types::BovidImageResponse;
use crate::features::shared::validation::{FieldErrors, INVALID_IMAGE, NO_FILE};
use crate::models::UserId;
use crate::storage::{image::detect_image, image_key, MediaStorage};
use crate::store::{HerdStore, StoreError};

/// Multipart field carrying the file
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Clone)]
pub struct UploadImageCommand {
    pub id: i64,
    /// Bytes of the `image` part, `None` when the part was absent
    pub data: Option<Vec<u8>>,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadImageError {
    #[error("Bovid '{0}' not found")]
    NotFound(i64),

    #[error("Invalid image: {0}")]
    Validation(FieldErrors),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Media storage error: {0}")]
    Storage(anyhow::Error),
}

/// Store the image under a fresh key and point the bovid at it
///
/// The previous image, if any, is deleted once the row references the new
/// key. When the row update fails the new object is removed again.
#[tracing::instrument(skip(store, media, command), fields(id = command.id))]
pub async fn handle(
    store: &dyn HerdStore,
    media: &MediaStorage,
    owner: UserId,
    command: UploadImageCommand,
) -> Result<BovidImageResponse, UploadImageError> {
    let existing = store
        .get_bovid(owner, command.id)
        .await?
        .ok_or(UploadImageError::NotFound(command.id))?;

    let data = match command.data {
        Some(data) if !data.is_empty() => data,
        _ => return Err(UploadImageError::Validation(FieldErrors::single(IMAGE_FIELD, NO_FILE))),
    };

    let detected = detect_image(&data).ok_or_else(|| {
        UploadImageError::Validation(FieldErrors::single(IMAGE_FIELD, INVALID_IMAGE))
    })?;

    let key = image_key(detected.extension());
    media
        .put(&key, data, detected.content_type())
        .await
        .map_err(UploadImageError::Storage)?;

    let updated = match store.set_bovid_image(owner, command.id, Some(key.clone())).await {
        Ok(Some(bovid)) => bovid,
        result => {
            if let Err(e) = media.delete(&key).await {
                tracing::warn!(key = %key, error = %e, "Failed to remove orphaned upload");
            }
            return match result {
                Err(e) => Err(e.into()),
                _ => Err(UploadImageError::NotFound(command.id)),
            };
        },
    };

    if let Some(old) = existing.image.as_deref().filter(|old| *old != key) {
        if let Err(e) = media.delete(old).await {
            tracing::warn!(key = old, error = %e, "Failed to remove replaced image");
        }
    }

    tracing::info!(bovid_id = updated.id, key = %key, format = ?detected.format, "Bovid image stored");

    Ok(BovidImageResponse {
        id: updated.id,
        image: updated.image.as_deref().map(|k| media.public_url(k)),
    })
}
