//! Life event API routes
//!
//! - `GET /api/v1/cattle/events` - List the caller's events, optionally for one bovid
//! - `POST /api/v1/cattle/events` - Record an event against one of the caller's bovids

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use super::{
    commands::{CreateEventCommand, CreateEventError},
    queries::{ListEventsError, ListEventsQuery},
};
use crate::api::extract::{JsonBody, QueryParams};
use crate::api::response::ApiResponse;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::features::FeatureState;
use crate::store::SharedStore;

pub fn events_routes() -> Router<FeatureState> {
    Router::new().route("/", get(list_events).post(create_event))
}

/// `POST /api/v1/cattle/events`
///
/// - `201 Created` - the stored event
/// - `400 Bad Request` - field errors, including a `bovid` the caller does not own
#[tracing::instrument(skip(store, user, command), fields(user_id = user.id()))]
async fn create_event(
    State(store): State<SharedStore>,
    user: AuthUser,
    JsonBody(command): JsonBody<CreateEventCommand>,
) -> Result<Response, EventApiError> {
    let event = super::commands::create::handle(store.as_ref(), user.id(), command).await?;
    Ok(ApiResponse::success(event).with_status(StatusCode::CREATED))
}

/// `GET /api/v1/cattle/events?bovid=<id>`
#[tracing::instrument(skip(store, user), fields(user_id = user.id()))]
async fn list_events(
    State(store): State<SharedStore>,
    user: AuthUser,
    QueryParams(query): QueryParams<ListEventsQuery>,
) -> Result<Response, EventApiError> {
    let events = super::queries::list::handle(store.as_ref(), user.id(), query).await?;
    Ok(ApiResponse::success(events).into_response())
}

#[derive(Debug, thiserror::Error)]
enum EventApiError {
    #[error(transparent)]
    Create(#[from] CreateEventError),

    #[error(transparent)]
    List(#[from] ListEventsError),
}

impl From<EventApiError> for AppError {
    fn from(err: EventApiError) -> Self {
        match err {
            EventApiError::Create(CreateEventError::Validation(errors))
            | EventApiError::List(ListEventsError::Validation(errors)) => {
                AppError::Validation(errors)
            },
            EventApiError::Create(CreateEventError::Store(e))
            | EventApiError::List(ListEventsError::Store(e)) => AppError::Store(e),
        }
    }
}

impl IntoResponse for EventApiError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
