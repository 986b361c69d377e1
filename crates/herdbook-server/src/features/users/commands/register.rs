//! Register user command

use serde::Deserialize;

use crate::auth::password::{hash_password_blocking, PasswordError};
use crate::features::shared::fields::Field;
use crate::features::shared::validation::{clean_required, FieldErrors};
use crate::features::users::types::{
    clean_password, clean_phone, DUPLICATE_EMAIL, EMAIL_MAX_LENGTH, INVALID_EMAIL, NAME_MAX_LENGTH,
};
use crate::models::{is_valid_email, normalize_email, NewUser, User};
use crate::store::{HerdStore, StoreError};

/// Request body for `POST /users`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterUserCommand {
    #[serde(default)]
    pub email: Field<String>,
    #[serde(default)]
    pub password: Field<String>,
    #[serde(default)]
    pub name: Field<String>,
    #[serde(default)]
    pub phone: Field<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RegisterUserError {
    #[error("Invalid registration: {0}")]
    Validation(FieldErrors),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Validated registration, password still in clear
#[derive(Debug)]
struct Registration {
    email: String,
    password: String,
    name: String,
    phone: Option<String>,
}

impl RegisterUserCommand {
    fn validate(self) -> Result<Registration, RegisterUserError> {
        let mut errors = FieldErrors::new();

        let email = clean_required(&mut errors, "email", self.email, EMAIL_MAX_LENGTH);
        let email = normalize_email(&email);
        if !errors.contains("email") && !is_valid_email(&email) {
            errors.add("email", INVALID_EMAIL);
        }

        let password = clean_password(&mut errors, "password", self.password);
        let name = clean_required(&mut errors, "name", self.name, NAME_MAX_LENGTH);
        let phone = clean_phone(&mut errors, self.phone);

        errors.into_result().map_err(RegisterUserError::Validation)?;
        Ok(Registration {
            email,
            password,
            name,
            phone,
        })
    }
}

/// Create a regular account
#[tracing::instrument(skip(store, command))]
pub async fn handle(
    store: &dyn HerdStore,
    command: RegisterUserCommand,
) -> Result<User, RegisterUserError> {
    create(store, command, false).await
}

/// Create a staff superuser; only reachable from the admin CLI
#[tracing::instrument(skip(store, command))]
pub async fn handle_superuser(
    store: &dyn HerdStore,
    command: RegisterUserCommand,
) -> Result<User, RegisterUserError> {
    create(store, command, true).await
}

async fn create(
    store: &dyn HerdStore,
    command: RegisterUserCommand,
    superuser: bool,
) -> Result<User, RegisterUserError> {
    let registration = command.validate()?;

    if store.find_user_by_email(&registration.email).await?.is_some() {
        return Err(duplicate_email());
    }

    let password_hash = hash_password_blocking(registration.password).await?;

    let new_user = NewUser {
        email: registration.email,
        name: registration.name,
        phone: registration.phone,
        password_hash,
        is_staff: superuser,
        is_superuser: superuser,
    };

    // A concurrent registration can still win the unique index
    let user = match store.create_user(new_user).await {
        Ok(user) => user,
        Err(StoreError::Conflict(_)) => return Err(duplicate_email()),
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = user.id, superuser, "User registered");
    Ok(user)
}

fn duplicate_email() -> RegisterUserError {
    RegisterUserError::Validation(FieldErrors::single("email", DUPLICATE_EMAIL))
}
