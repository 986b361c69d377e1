//! Create life event command

use serde::Deserialize;

use crate::features::events::types::EventResponse;
use crate::features::shared::fields::Field;
use crate::features::shared::validation::{
    clean_date, clean_optional, clean_required, invalid_pk_message, FieldErrors, NULL, REQUIRED,
};
use crate::models::{NewLifeEvent, UserId};
use crate::store::{HerdStore, StoreError};

pub const EVENT_TYPE_MAX_LENGTH: usize = 100;

/// Request body for `POST /cattle/events`
///
/// ```json
/// { "bovid": 4, "event_type": "inoculation", "notes": "", "event_date": "2020-03-01" }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateEventCommand {
    #[serde(default)]
    pub bovid: Field<i64>,
    #[serde(default)]
    pub event_type: Field<String>,
    #[serde(default)]
    pub notes: Field<String>,
    #[serde(default)]
    pub event_date: Field<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateEventError {
    #[error("Invalid life event: {0}")]
    Validation(FieldErrors),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

#[tracing::instrument(skip(store, command))]
pub async fn handle(
    store: &dyn HerdStore,
    owner: UserId,
    command: CreateEventCommand,
) -> Result<EventResponse, CreateEventError> {
    let mut errors = FieldErrors::new();

    let bovid_id = match command.bovid {
        Field::Missing => {
            errors.add("bovid", REQUIRED);
            None
        },
        Field::Null => {
            errors.add("bovid", NULL);
            None
        },
        Field::Value(id) => {
            // Another user's bovid is reported exactly like a missing one
            if store.get_bovid(owner, id).await?.is_none() {
                errors.add("bovid", invalid_pk_message(id));
            }
            Some(id)
        },
    };

    let event_type =
        clean_required(&mut errors, "event_type", command.event_type, EVENT_TYPE_MAX_LENGTH);
    let notes = clean_optional(&mut errors, "notes", command.notes, usize::MAX);

    let event_date = match command.event_date {
        Field::Missing => {
            errors.add("event_date", REQUIRED);
            None
        },
        Field::Null => {
            errors.add("event_date", NULL);
            None
        },
        Field::Value(raw) => clean_date(&mut errors, "event_date", Some(&raw)),
    };

    // A `None` above always comes with a recorded error
    let new_event = match (bovid_id, event_date) {
        (Some(bovid_id), Some(event_date)) if errors.is_empty() => NewLifeEvent {
            bovid_id,
            event_type,
            notes,
            event_date,
        },
        _ => return Err(CreateEventError::Validation(errors)),
    };
    let bovid_id = new_event.bovid_id;

    let event = store.create_event(owner, new_event).await?;

    tracing::info!(event_id = event.id, bovid_id, "Life event created");

    Ok(event.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::validation::INVALID_DATE;
    use crate::models::BovidFields;
    use crate::store::MemoryStore;

    async fn store_with_bovid(owner: UserId) -> (MemoryStore, i64) {
        let store = MemoryStore::new();
        let bovid = store
            .create_bovid(
                owner,
                BovidFields {
                    name: "Bessie".to_string(),
                    type_of_bovid: "cow".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        (store, bovid.id)
    }

    fn command(bovid: i64) -> CreateEventCommand {
        CreateEventCommand {
            bovid: Field::Value(bovid),
            event_type: Field::Value("inoculation".to_string()),
            notes: Field::Missing,
            event_date: Field::Value("2020-03-01".to_string()),
        }
    }

    #[tokio::test]
    async fn test_missing_bovid_is_reported_on_bovid_only() {
        let (store, bovid_id) = store_with_bovid(1).await;
        let mut cmd = command(bovid_id);
        cmd.bovid = Field::Missing;

        match handle(&store, 1, cmd).await {
            Err(CreateEventError::Validation(errors)) => {
                assert_eq!(errors.get("bovid").unwrap(), [REQUIRED]);
                assert!(!errors.contains("event_date"));
            },
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_creates_event_for_own_bovid() {
        let (store, bovid_id) = store_with_bovid(1).await;
        let event = handle(&store, 1, command(bovid_id)).await.unwrap();
        assert_eq!(event.bovid, bovid_id);
        assert_eq!(event.notes, "");
        assert_eq!(event.event_date.to_string(), "2020-03-01");
    }

    #[tokio::test]
    async fn test_rejects_foreign_bovid() {
        let (store, bovid_id) = store_with_bovid(1).await;
        match handle(&store, 2, command(bovid_id)).await {
            Err(CreateEventError::Validation(errors)) => {
                assert_eq!(errors.get("bovid").unwrap(), [invalid_pk_message(bovid_id)]);
            },
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_collects_all_field_errors() {
        let store = MemoryStore::new();
        let command = CreateEventCommand {
            event_date: Field::Value("yesterday".to_string()),
            ..Default::default()
        };
        match handle(&store, 1, command).await {
            Err(CreateEventError::Validation(errors)) => {
                assert_eq!(errors.get("bovid").unwrap(), [REQUIRED]);
                assert_eq!(errors.get("event_type").unwrap(), [REQUIRED]);
                assert_eq!(errors.get("event_date").unwrap(), [INVALID_DATE]);
            },
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
