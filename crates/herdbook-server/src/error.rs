//! Server-specific error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::response::ErrorResponse;
use crate::features::shared::validation::FieldErrors;
use crate::store::StoreError;

/// Request-level error rendered into the standard error envelope
///
/// Feature slices convert their command/query errors into this type; the
/// request extractors reject with it directly.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication credentials were not provided or are invalid.")]
    Unauthorized,

    #[error("Not found.")]
    NotFound,

    #[error("Invalid input: {0}")]
    Validation(FieldErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Media storage error: {0}")]
    Storage(anyhow::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound | AppError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) | AppError::Storage(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Unauthorized => ErrorResponse::new("UNAUTHORIZED", self.to_string()),
            AppError::NotFound | AppError::Store(StoreError::NotFound(_)) => {
                ErrorResponse::new("NOT_FOUND", "Not found.")
            },
            AppError::Validation(ref errors) => {
                ErrorResponse::new("VALIDATION_ERROR", "Invalid input.").details(errors.to_json())
            },
            AppError::BadRequest(ref message) => ErrorResponse::new("BAD_REQUEST", message.clone()),
            AppError::Store(ref e) => {
                tracing::error!("Store error: {:?}", e);
                ErrorResponse::new("INTERNAL_ERROR", "A database error occurred")
            },
            AppError::Storage(ref e) => {
                tracing::error!("Media storage error: {:#}", e);
                ErrorResponse::new("STORAGE_ERROR", "A media storage error occurred")
            },
            AppError::Internal(ref message) => {
                tracing::error!("Internal error: {}", message);
                ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred")
            },
        };

        (status, Json(body)).into_response()
    }
}
