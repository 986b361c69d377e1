use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::models::LifeEvent;

/// Wire form of a life event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventResponse {
    pub id: i64,
    pub bovid: i64,
    pub event_type: String,
    pub notes: String,
    pub event_date: NaiveDate,
    pub created: DateTime<Utc>,
}

impl From<LifeEvent> for EventResponse {
    fn from(event: LifeEvent) -> Self {
        Self {
            id: event.id,
            bovid: event.bovid_id,
            event_type: event.event_type,
            notes: event.notes,
            event_date: event.event_date,
            created: event.created,
        }
    }
}
