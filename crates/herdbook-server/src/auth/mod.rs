//! Token authentication
//!
//! [`AuthUser`] is the single ownership guard for the resource endpoints: a
//! handler that takes it cannot run for an anonymous caller, and the resolved
//! user id is what every store call is scoped by.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::AppError;
use crate::models::{User, UserId};
use crate::store::SharedStore;

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password, PasswordError};
pub use token::{generate_key, parse_authorization};

/// The authenticated caller
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn id(&self) -> UserId {
        self.0.id
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    SharedStore: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let key = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_authorization)
            .ok_or(AppError::Unauthorized)?;

        let store: SharedStore = FromRef::from_ref(state);
        match store.find_user_by_token(key).await? {
            Some(user) if user.is_active => {
                tracing::debug!(user_id = user.id, "Authenticated request");
                Ok(AuthUser(user))
            },
            Some(user) => {
                tracing::debug!(user_id = user.id, "Rejected token of inactive user");
                Err(AppError::Unauthorized)
            },
            None => Err(AppError::Unauthorized),
        }
    }
}
