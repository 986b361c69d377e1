use serde::Deserialize;

use crate::features::shared::validation::{parse_id_list, FieldErrors};
use crate::models::{Bovid, UserId};
use crate::store::{BovidFilter, HerdStore, StoreError};

/// Query string for `GET /cattle/bovids`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListBovidsQuery {
    /// Comma-separated tag ids, e.g. `tags=1,2`
    pub tags: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ListBovidsError {
    #[error("Invalid query: {0}")]
    Validation(FieldErrors),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ListBovidsQuery {
    /// An absent or empty `tags` parameter does not filter
    pub fn filter(&self) -> Result<BovidFilter, ListBovidsError> {
        let tag_ids = match self.tags.as_deref() {
            None => None,
            Some(raw) => {
                let ids = parse_id_list(raw).map_err(|message| {
                    ListBovidsError::Validation(FieldErrors::single("tags", message))
                })?;
                (!ids.is_empty()).then_some(ids)
            },
        };
        Ok(BovidFilter { tag_ids })
    }
}

#[tracing::instrument(skip(store))]
pub async fn handle(
    store: &dyn HerdStore,
    owner: UserId,
    query: ListBovidsQuery,
) -> Result<Vec<Bovid>, ListBovidsError> {
    let filter = query.filter()?;
    let bovids = store.list_bovids(owner, &filter).await?;
    Ok(bovids)
}
