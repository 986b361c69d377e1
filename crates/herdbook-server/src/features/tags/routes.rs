//! Tag API routes
//!
//! - `GET /api/v1/cattle/tags` - List the caller's tags, name descending
//! - `POST /api/v1/cattle/tags` - Create a tag owned by the caller

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use super::{
    commands::{CreateTagCommand, CreateTagError},
    queries::{ListTagsError, ListTagsQuery},
};
use crate::api::extract::{JsonBody, QueryParams};
use crate::api::response::ApiResponse;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::features::FeatureState;
use crate::store::SharedStore;

pub fn tags_routes() -> Router<FeatureState> {
    Router::new().route("/", get(list_tags).post(create_tag))
}

/// Create a tag
///
/// # Endpoint
///
/// `POST /api/v1/cattle/tags`
///
/// ```json
/// { "name": "Vaccinated" }
/// ```
///
/// # Response
///
/// - `201 Created` - `{id, name}`
/// - `400 Bad Request` - `name` missing, blank or too long
/// - `401 Unauthorized`
#[tracing::instrument(skip(store, user, command), fields(user_id = user.id()))]
async fn create_tag(
    State(store): State<SharedStore>,
    user: AuthUser,
    JsonBody(command): JsonBody<CreateTagCommand>,
) -> Result<Response, TagApiError> {
    let tag = super::commands::create::handle(store.as_ref(), user.id(), command).await?;
    Ok(ApiResponse::success(tag).with_status(StatusCode::CREATED))
}

/// List tags
///
/// # Endpoint
///
/// `GET /api/v1/cattle/tags?assigned_only=1`
#[tracing::instrument(skip(store, user), fields(user_id = user.id()))]
async fn list_tags(
    State(store): State<SharedStore>,
    user: AuthUser,
    QueryParams(query): QueryParams<ListTagsQuery>,
) -> Result<Response, TagApiError> {
    let tags = super::queries::list::handle(store.as_ref(), user.id(), query).await?;

    tracing::debug!(count = tags.len(), "Tags listed via API");

    Ok(ApiResponse::success(tags).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Unified error type for tag API endpoints
#[derive(Debug, thiserror::Error)]
enum TagApiError {
    #[error(transparent)]
    Create(#[from] CreateTagError),

    #[error(transparent)]
    List(#[from] ListTagsError),
}

impl From<TagApiError> for AppError {
    fn from(err: TagApiError) -> Self {
        match err {
            TagApiError::Create(CreateTagError::Validation(errors))
            | TagApiError::List(ListTagsError::Validation(errors)) => AppError::Validation(errors),
            TagApiError::Create(CreateTagError::Store(e))
            | TagApiError::List(ListTagsError::Store(e)) => AppError::Store(e),
        }
    }
}

impl IntoResponse for TagApiError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
