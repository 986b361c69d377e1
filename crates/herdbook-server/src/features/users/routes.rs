//! User API routes
//!
//! - `POST /api/v1/users` - Register (public)
//! - `POST /api/v1/users/token` - Exchange email and password for a token (public)
//! - `GET /api/v1/users/me` - The caller's profile
//! - `PATCH /api/v1/users/me` - Change name, phone or password

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};

use super::commands::{
    IssueTokenCommand, IssueTokenError, RegisterUserCommand, RegisterUserError, UpdateMeCommand,
    UpdateMeError,
};
use crate::api::extract::JsonBody;
use crate::api::response::ApiResponse;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::features::FeatureState;
use crate::store::SharedStore;

pub fn users_routes() -> Router<FeatureState> {
    Router::new()
        .route("/", post(register))
        .route("/token", post(issue_token))
        .route("/me", get(get_me).patch(update_me))
}

/// `POST /api/v1/users`
///
/// ```json
/// { "email": "farmer@example.com", "password": "secret", "name": "Farmer" }
/// ```
///
/// - `201 Created` - `{id, email, name, phone, is_staff}`
/// - `400 Bad Request` - invalid fields or email already registered
#[tracing::instrument(skip(store, command))]
async fn register(
    State(store): State<SharedStore>,
    JsonBody(command): JsonBody<RegisterUserCommand>,
) -> Result<Response, UserApiError> {
    let user = super::commands::register::handle(store.as_ref(), command).await?;
    Ok(ApiResponse::success(user).with_status(StatusCode::CREATED))
}

/// `POST /api/v1/users/token`
///
/// - `200 OK` - `{token}`
/// - `400 Bad Request` - wrong credentials or inactive account
#[tracing::instrument(skip(store, command))]
async fn issue_token(
    State(store): State<SharedStore>,
    JsonBody(command): JsonBody<IssueTokenCommand>,
) -> Result<Response, UserApiError> {
    let token = super::commands::issue_token::handle(store.as_ref(), command).await?;
    Ok(ApiResponse::success(token).into_response())
}

/// `GET /api/v1/users/me`
#[tracing::instrument(skip(user), fields(user_id = user.id()))]
async fn get_me(user: AuthUser) -> Response {
    ApiResponse::success(user.0).into_response()
}

/// `PATCH /api/v1/users/me`
#[tracing::instrument(skip(store, user, command), fields(user_id = user.id()))]
async fn update_me(
    State(store): State<SharedStore>,
    user: AuthUser,
    JsonBody(command): JsonBody<UpdateMeCommand>,
) -> Result<Response, UserApiError> {
    let user = super::commands::update_me::handle(store.as_ref(), user.id(), command).await?;
    Ok(ApiResponse::success(user).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
enum UserApiError {
    #[error(transparent)]
    Register(#[from] RegisterUserError),
    #[error(transparent)]
    IssueToken(#[from] IssueTokenError),
    #[error(transparent)]
    UpdateMe(#[from] UpdateMeError),
}

impl From<UserApiError> for AppError {
    fn from(err: UserApiError) -> Self {
        use UserApiError as E;

        match err {
            E::Register(RegisterUserError::Validation(errors))
            | E::IssueToken(IssueTokenError::Validation(errors))
            | E::UpdateMe(UpdateMeError::Validation(errors)) => AppError::Validation(errors),

            E::Register(RegisterUserError::Store(e))
            | E::IssueToken(IssueTokenError::Store(e))
            | E::UpdateMe(UpdateMeError::Store(e)) => AppError::Store(e),

            E::Register(RegisterUserError::Password(e))
            | E::IssueToken(IssueTokenError::Password(e))
            | E::UpdateMe(UpdateMeError::Password(e)) => {
                tracing::error!(error = %e, "Password hashing failed");
                AppError::Internal("Failed to process credentials".to_string())
            },
        }
    }
}

impl IntoResponse for UserApiError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
