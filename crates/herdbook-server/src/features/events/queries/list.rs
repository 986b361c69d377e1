use serde::Deserialize;

use crate::features::events::types::EventResponse;
use crate::features::shared::validation::FieldErrors;
use crate::models::UserId;
use crate::store::{EventFilter, HerdStore, StoreError};

/// Query string for `GET /cattle/events`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListEventsQuery {
    /// Only events of this bovid
    pub bovid: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListEventsError {
    #[error("Invalid query: {0}")]
    Validation(FieldErrors),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ListEventsQuery {
    pub fn filter(&self) -> Result<EventFilter, ListEventsError> {
        let bovid_id = match self.bovid.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<i64>().map_err(|_| {
                ListEventsError::Validation(FieldErrors::single("bovid", "A valid integer is required."))
            })?),
        };
        Ok(EventFilter { bovid_id })
    }
}

#[tracing::instrument(skip(store))]
pub async fn handle(
    store: &dyn HerdStore,
    owner: UserId,
    query: ListEventsQuery,
) -> Result<Vec<EventResponse>, ListEventsError> {
    let filter = query.filter()?;
    let events = store.list_events(owner, filter).await?;
    Ok(events.into_iter().map(EventResponse::from).collect())
}
