//! Bovid API routes
//!
//! # Route Structure
//!
//! - `GET /api/v1/cattle/bovids` - List the caller's bovids, newest first (`?tags=1,2`)
//! - `POST /api/v1/cattle/bovids` - Create a bovid
//! - `GET /api/v1/cattle/bovids/:id` - Detail with tags expanded to `{id, name}`
//! - `PUT /api/v1/cattle/bovids/:id` - Full update
//! - `PATCH /api/v1/cattle/bovids/:id` - Partial update
//! - `DELETE /api/v1/cattle/bovids/:id` - Delete with its life events
//! - `POST /api/v1/cattle/bovids/:id/upload-image` - Multipart `image` upload
//!
//! Bovids of other users answer 404 on every `:id` route.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};

use super::{
    commands::{
        upload_image::IMAGE_FIELD, CreateBovidError, DeleteBovidError, UpdateBovidCommand,
        UpdateBovidError, UploadImageCommand, UploadImageError,
    },
    queries::{GetBovidError, ListBovidsError, ListBovidsQuery},
    types::{BovidDetailResponse, BovidPayload, BovidResponse},
};
use crate::api::extract::{JsonBody, QueryParams, ResourceId};
use crate::api::response::ApiResponse;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::features::FeatureState;
use crate::storage::MediaStorage;
use crate::store::SharedStore;

pub fn bovids_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_bovids).post(create_bovid))
        .route(
            "/:id",
            get(get_bovid)
                .put(replace_bovid)
                .patch(patch_bovid)
                .delete(delete_bovid),
        )
        .route("/:id/upload-image", post(upload_image))
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// `POST /api/v1/cattle/bovids`
///
/// ```json
/// { "name": "Bessie", "type_of_bovid": "cow", "price": "5.00", "tags": [1, 2] }
/// ```
///
/// - `201 Created` - list representation of the new bovid
/// - `400 Bad Request` - field errors
#[tracing::instrument(skip(store, media, user, payload), fields(user_id = user.id()))]
async fn create_bovid(
    State(store): State<SharedStore>,
    State(media): State<MediaStorage>,
    user: AuthUser,
    JsonBody(payload): JsonBody<BovidPayload>,
) -> Result<Response, BovidApiError> {
    let bovid = super::commands::create::handle(store.as_ref(), user.id(), payload).await?;
    Ok(ApiResponse::success(BovidResponse::from_bovid(bovid, &media))
        .with_status(StatusCode::CREATED))
}

/// `PUT /api/v1/cattle/bovids/:id`
#[tracing::instrument(skip(store, media, user, payload), fields(user_id = user.id()))]
async fn replace_bovid(
    State(store): State<SharedStore>,
    State(media): State<MediaStorage>,
    user: AuthUser,
    ResourceId(id): ResourceId,
    JsonBody(payload): JsonBody<BovidPayload>,
) -> Result<Response, BovidApiError> {
    update(store, media, user, id, payload, false).await
}

/// `PATCH /api/v1/cattle/bovids/:id`
#[tracing::instrument(skip(store, media, user, payload), fields(user_id = user.id()))]
async fn patch_bovid(
    State(store): State<SharedStore>,
    State(media): State<MediaStorage>,
    user: AuthUser,
    ResourceId(id): ResourceId,
    JsonBody(payload): JsonBody<BovidPayload>,
) -> Result<Response, BovidApiError> {
    update(store, media, user, id, payload, true).await
}

async fn update(
    store: SharedStore,
    media: MediaStorage,
    user: AuthUser,
    id: i64,
    payload: BovidPayload,
    partial: bool,
) -> Result<Response, BovidApiError> {
    let command = UpdateBovidCommand {
        id,
        payload,
        partial,
    };
    let bovid = super::commands::update::handle(store.as_ref(), user.id(), command).await?;
    Ok(ApiResponse::success(BovidResponse::from_bovid(bovid, &media)).into_response())
}

/// `DELETE /api/v1/cattle/bovids/:id`
///
/// - `204 No Content`
/// - `404 Not Found`
#[tracing::instrument(skip(store, media, user), fields(user_id = user.id()))]
async fn delete_bovid(
    State(store): State<SharedStore>,
    State(media): State<MediaStorage>,
    user: AuthUser,
    ResourceId(id): ResourceId,
) -> Result<Response, BovidApiError> {
    super::commands::delete::handle(store.as_ref(), &media, user.id(), id).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// `POST /api/v1/cattle/bovids/:id/upload-image`
///
/// Multipart form with a single file part named `image`.
///
/// - `200 OK` - `{id, image}`
/// - `400 Bad Request` - missing part or not a decodable image
/// - `404 Not Found`
#[tracing::instrument(skip(store, media, user, multipart), fields(user_id = user.id()))]
async fn upload_image(
    State(store): State<SharedStore>,
    State(media): State<MediaStorage>,
    user: AuthUser,
    ResourceId(id): ResourceId,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, BovidApiError> {
    let mut multipart = multipart.map_err(AppError::from)?;
    let data = read_file_field(&mut multipart, IMAGE_FIELD).await?;

    let command = UploadImageCommand { id, data };
    let response =
        super::commands::upload_image::handle(store.as_ref(), &media, user.id(), command).await?;

    Ok(ApiResponse::success(response).into_response())
}

/// Bytes of the first part called `name`; other parts are skipped
async fn read_file_field(
    multipart: &mut Multipart,
    name: &str,
) -> Result<Option<Vec<u8>>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() == Some(name) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            return Ok(Some(bytes.to_vec()));
        }
    }
    Ok(None)
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

/// `GET /api/v1/cattle/bovids?tags=1,2`
#[tracing::instrument(skip(store, media, user), fields(user_id = user.id()))]
async fn list_bovids(
    State(store): State<SharedStore>,
    State(media): State<MediaStorage>,
    user: AuthUser,
    QueryParams(query): QueryParams<ListBovidsQuery>,
) -> Result<Response, BovidApiError> {
    let bovids = super::queries::list::handle(store.as_ref(), user.id(), query).await?;

    tracing::debug!(count = bovids.len(), "Bovids listed via API");

    let items: Vec<BovidResponse> = bovids
        .into_iter()
        .map(|bovid| BovidResponse::from_bovid(bovid, &media))
        .collect();
    Ok(ApiResponse::success(items).into_response())
}

/// `GET /api/v1/cattle/bovids/:id`
#[tracing::instrument(skip(store, media, user), fields(user_id = user.id()))]
async fn get_bovid(
    State(store): State<SharedStore>,
    State(media): State<MediaStorage>,
    user: AuthUser,
    ResourceId(id): ResourceId,
) -> Result<Response, BovidApiError> {
    let (bovid, tags) = super::queries::get::handle(store.as_ref(), user.id(), id).await?;
    Ok(ApiResponse::success(BovidDetailResponse::new(bovid, tags, &media)).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Unified error type for bovid API endpoints
#[derive(Debug, thiserror::Error)]
enum BovidApiError {
    #[error(transparent)]
    Create(#[from] CreateBovidError),
    #[error(transparent)]
    Update(#[from] UpdateBovidError),
    #[error(transparent)]
    Delete(#[from] DeleteBovidError),
    #[error(transparent)]
    Upload(#[from] UploadImageError),
    #[error(transparent)]
    Get(#[from] GetBovidError),
    #[error(transparent)]
    List(#[from] ListBovidsError),
    #[error(transparent)]
    Request(#[from] AppError),
}

impl From<BovidApiError> for AppError {
    fn from(err: BovidApiError) -> Self {
        use BovidApiError as E;

        match err {
            E::Update(UpdateBovidError::NotFound(_))
            | E::Delete(DeleteBovidError::NotFound(_))
            | E::Upload(UploadImageError::NotFound(_))
            | E::Get(GetBovidError::NotFound(_)) => AppError::NotFound,

            E::Create(CreateBovidError::Validation(errors))
            | E::Update(UpdateBovidError::Validation(errors))
            | E::Upload(UploadImageError::Validation(errors))
            | E::List(ListBovidsError::Validation(errors)) => AppError::Validation(errors),

            E::Create(CreateBovidError::Store(e))
            | E::Update(UpdateBovidError::Store(e))
            | E::Delete(DeleteBovidError::Store(e))
            | E::Upload(UploadImageError::Store(e))
            | E::Get(GetBovidError::Store(e))
            | E::List(ListBovidsError::Store(e)) => AppError::Store(e),

            E::Upload(UploadImageError::Storage(e)) => AppError::Storage(e),
            E::Request(e) => e,
        }
    }
}

impl IntoResponse for BovidApiError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_variants_map_to_404() {
        for err in [
            BovidApiError::Update(UpdateBovidError::NotFound(1)),
            BovidApiError::Delete(DeleteBovidError::NotFound(1)),
            BovidApiError::Upload(UploadImageError::NotFound(1)),
            BovidApiError::Get(GetBovidError::NotFound(1)),
        ] {
            assert_eq!(AppError::from(err).status(), StatusCode::NOT_FOUND);
        }
    }
}
