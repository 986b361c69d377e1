//! Update own profile command

use serde::Deserialize;

use crate::auth::password::{hash_password_blocking, PasswordError};
use crate::features::shared::fields::Field;
use crate::features::shared::validation::{clean_required, FieldErrors};
use crate::features::users::types::{clean_password, clean_phone, NAME_MAX_LENGTH};
use crate::models::{User, UserChanges, UserId};
use crate::store::{HerdStore, StoreError};

/// Request body for `PATCH /users/me`
///
/// Only the members present are changed. `email` is not editable here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMeCommand {
    #[serde(default)]
    pub name: Field<String>,
    #[serde(default)]
    pub phone: Field<String>,
    #[serde(default)]
    pub password: Field<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateMeError {
    #[error("Invalid profile: {0}")]
    Validation(FieldErrors),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

#[tracing::instrument(skip(store, command))]
pub async fn handle(
    store: &dyn HerdStore,
    user_id: UserId,
    command: UpdateMeCommand,
) -> Result<User, UpdateMeError> {
    let mut errors = FieldErrors::new();

    let name = (!command.name.is_missing())
        .then(|| clean_required(&mut errors, "name", command.name, NAME_MAX_LENGTH));
    let phone = (!command.phone.is_missing()).then(|| clean_phone(&mut errors, command.phone));
    let password = (!command.password.is_missing())
        .then(|| clean_password(&mut errors, "password", command.password));

    errors.into_result().map_err(UpdateMeError::Validation)?;

    let password_hash = match password {
        Some(password) => Some(hash_password_blocking(password).await?),
        None => None,
    };

    let changes = UserChanges {
        name,
        phone,
        password_hash,
        is_active: None,
    };
    let user = store.update_user(user_id, changes).await?;

    tracing::info!(user_id, "Profile updated");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{hash_password, verify_password};
    use crate::models::NewUser;
    use crate::store::MemoryStore;

    async fn setup() -> (MemoryStore, User) {
        let store = MemoryStore::new();
        let user = store
            .create_user(NewUser {
                email: "test@holmegrown.com".to_string(),
                name: "Test".to_string(),
                phone: Some("0825550000".to_string()),
                password_hash: hash_password("testpass").unwrap(),
                is_staff: false,
                is_superuser: false,
            })
            .await
            .unwrap();
        (store, user)
    }

    #[tokio::test]
    async fn test_partial_update_keeps_omitted_fields() {
        let (store, user) = setup().await;
        let command = UpdateMeCommand {
            name: Field::Value("New Name".to_string()),
            ..Default::default()
        };

        let updated = handle(&store, user.id, command).await.unwrap();
        assert_eq!(updated.name, "New Name");
        assert_eq!(updated.phone.as_deref(), Some("0825550000"));
        assert_eq!(updated.password_hash, user.password_hash);
    }

    #[tokio::test]
    async fn test_password_is_rehashed_and_phone_cleared() {
        let (store, user) = setup().await;
        let command = UpdateMeCommand {
            phone: Field::Null,
            password: Field::Value("newpassword".to_string()),
            ..Default::default()
        };

        let updated = handle(&store, user.id, command).await.unwrap();
        assert_eq!(updated.phone, None);
        assert!(verify_password("newpassword", &updated.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let (store, user) = setup().await;
        let command = UpdateMeCommand {
            password: Field::Value("pw".to_string()),
            ..Default::default()
        };

        assert!(matches!(
            handle(&store, user.id, command).await,
            Err(UpdateMeError::Validation(errors)) if errors.contains("password")
        ));
    }
}
