//! Exchange credentials for an API token

use serde::Deserialize;

use crate::auth::generate_key;
use crate::auth::password::{verify_password_blocking, PasswordError};
use crate::features::shared::fields::Field;
use crate::features::shared::validation::{FieldErrors, NON_FIELD_ERRORS, NULL, REQUIRED};
use crate::features::users::types::{TokenResponse, BAD_CREDENTIALS};
use crate::models::normalize_email;
use crate::store::{HerdStore, StoreError};

/// Request body for `POST /users/token`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueTokenCommand {
    #[serde(default)]
    pub email: Field<String>,
    #[serde(default)]
    pub password: Field<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum IssueTokenError {
    #[error("Invalid credentials: {0}")]
    Validation(FieldErrors),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

fn present(errors: &mut FieldErrors, field: &str, value: Field<String>) -> String {
    match value {
        Field::Missing => {
            errors.add(field, REQUIRED);
            String::new()
        },
        Field::Null => {
            errors.add(field, NULL);
            String::new()
        },
        Field::Value(value) => value,
    }
}

/// Returns the caller's existing token, minting one on first login
#[tracing::instrument(skip(store, command))]
pub async fn handle(
    store: &dyn HerdStore,
    command: IssueTokenCommand,
) -> Result<TokenResponse, IssueTokenError> {
    let mut errors = FieldErrors::new();
    let email = present(&mut errors, "email", command.email);
    let password = present(&mut errors, "password", command.password);
    errors.into_result().map_err(IssueTokenError::Validation)?;

    let rejected = || IssueTokenError::Validation(FieldErrors::single(NON_FIELD_ERRORS, BAD_CREDENTIALS));

    let Some(user) = store.find_user_by_email(&normalize_email(&email)).await? else {
        tracing::debug!("Token requested for unknown email");
        return Err(rejected());
    };

    if !verify_password_blocking(password, user.password_hash.clone()).await? {
        tracing::debug!(user_id = user.id, "Token requested with wrong password");
        return Err(rejected());
    }
    if !user.is_active {
        tracing::debug!(user_id = user.id, "Token requested for inactive user");
        return Err(rejected());
    }

    let token = store.get_or_create_token(user.id, &generate_key()).await?;
    tracing::info!(user_id = user.id, "Token issued");

    Ok(TokenResponse { token })
}
