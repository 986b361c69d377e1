//! Bovid request and response shapes
//!
//! List and write responses carry bare tag ids; the detail response expands
//! them to `{id, name}`. Prices are rendered as two-decimal strings and
//! images as public URLs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::features::shared::fields::Field;
use crate::features::shared::validation::{
    clean_date, clean_decimal, clean_optional, clean_required, invalid_pk_message, FieldErrors,
    NULL,
};
use crate::models::{Bovid, BovidFields, Tag, UserId};
use crate::storage::MediaStorage;
use crate::store::{HerdStore, StoreError};

pub const NAME_MAX_LENGTH: usize = 255;
pub const TYPE_OF_BOVID_MAX_LENGTH: usize = 100;
pub const BREED_MAX_LENGTH: usize = 100;
pub const BREEDER_MAX_LENGTH: usize = 250;
pub const PARENT_NAME_MAX_LENGTH: usize = 150;
pub const PRICE_MAX_DIGITS: u64 = 6;
pub const PRICE_DECIMAL_PLACES: u64 = 2;

/// Writable bovid fields as sent by clients
///
/// Unknown keys such as `id`, `user`, `image` or `created` are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BovidPayload {
    #[serde(default)]
    pub name: Field<String>,
    #[serde(default)]
    pub type_of_bovid: Field<String>,
    #[serde(default)]
    pub breed: Field<String>,
    #[serde(default)]
    pub breeder: Field<String>,
    #[serde(default)]
    pub mothers_name: Field<String>,
    #[serde(default)]
    pub fathers_name: Field<String>,
    #[serde(default)]
    pub price: Field<serde_json::Value>,
    #[serde(default)]
    pub date_of_birth: Field<String>,
    #[serde(default)]
    pub date_of_death: Field<String>,
    #[serde(default)]
    pub date_of_purchase: Field<String>,
    #[serde(default)]
    pub date_sold: Field<String>,
    #[serde(default)]
    pub tags: Field<Vec<i64>>,
}

fn nullable_date(
    errors: &mut FieldErrors,
    field: &str,
    value: Field<String>,
    current: Option<NaiveDate>,
) -> Option<NaiveDate> {
    match value {
        Field::Missing => current,
        Field::Null => None,
        Field::Value(raw) => clean_date(errors, field, Some(&raw)),
    }
}

impl BovidPayload {
    /// Validate into a full column set
    ///
    /// With `existing` (a partial update) omitted keys keep the stored value;
    /// without it omitted keys are required or reset to their defaults.
    pub fn clean(self, existing: Option<&Bovid>) -> (BovidFields, FieldErrors) {
        let mut errors = FieldErrors::new();
        let base = existing.map(BovidFields::from).unwrap_or_default();
        let partial = existing.is_some();

        let mut text = |field: &str, value: Field<String>, current: String, max: usize, required: bool| {
            if partial && value.is_missing() {
                current
            } else if required {
                clean_required(&mut errors, field, value, max)
            } else {
                clean_optional(&mut errors, field, value, max)
            }
        };

        let name = text("name", self.name, base.name, NAME_MAX_LENGTH, true);
        let type_of_bovid = text(
            "type_of_bovid",
            self.type_of_bovid,
            base.type_of_bovid,
            TYPE_OF_BOVID_MAX_LENGTH,
            true,
        );
        let breed = text("breed", self.breed, base.breed, BREED_MAX_LENGTH, false);
        let breeder = text("breeder", self.breeder, base.breeder, BREEDER_MAX_LENGTH, false);
        let mothers_name =
            text("mothers_name", self.mothers_name, base.mothers_name, PARENT_NAME_MAX_LENGTH, false);
        let fathers_name =
            text("fathers_name", self.fathers_name, base.fathers_name, PARENT_NAME_MAX_LENGTH, false);

        let price = match self.price {
            Field::Missing => base.price,
            Field::Null => None,
            Field::Value(value) => clean_decimal(
                &mut errors,
                "price",
                &value,
                PRICE_MAX_DIGITS,
                PRICE_DECIMAL_PLACES,
            ),
        };

        let date_of_birth =
            nullable_date(&mut errors, "date_of_birth", self.date_of_birth, base.date_of_birth);
        let date_of_death =
            nullable_date(&mut errors, "date_of_death", self.date_of_death, base.date_of_death);
        let date_of_purchase = nullable_date(
            &mut errors,
            "date_of_purchase",
            self.date_of_purchase,
            base.date_of_purchase,
        );
        let date_sold = nullable_date(&mut errors, "date_sold", self.date_sold, base.date_sold);

        let tag_ids = match self.tags {
            Field::Missing => base.tag_ids,
            Field::Null => {
                errors.add("tags", NULL);
                Vec::new()
            },
            Field::Value(ids) => ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect(),
        };

        let fields = BovidFields {
            mothers_name,
            fathers_name,
            type_of_bovid,
            breed,
            name,
            breeder,
            price,
            date_of_birth,
            date_of_death,
            date_of_purchase,
            date_sold,
            tag_ids,
        };

        (fields, errors)
    }
}

/// Record an error on `tags` for the first id the owner has no tag for
pub async fn check_tag_ownership(
    store: &dyn HerdStore,
    owner: UserId,
    tag_ids: &[i64],
    errors: &mut FieldErrors,
) -> Result<(), StoreError> {
    if tag_ids.is_empty() {
        return Ok(());
    }

    let owned: BTreeSet<i64> = store
        .find_tags(owner, tag_ids)
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();

    if let Some(missing) = tag_ids.iter().find(|id| !owned.contains(id)) {
        errors.add("tags", invalid_pk_message(missing));
    }
    Ok(())
}

/// Bovid representation, generic over how tags are rendered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BovidRepresentation<T> {
    pub id: i64,
    pub name: String,
    pub type_of_bovid: String,
    pub breed: String,
    pub breeder: String,
    pub mothers_name: String,
    pub fathers_name: String,
    pub price: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
    pub date_of_purchase: Option<NaiveDate>,
    pub date_sold: Option<NaiveDate>,
    pub tags: Vec<T>,
    pub image: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// List and write representation: `tags` are ids
pub type BovidResponse = BovidRepresentation<i64>;

/// Detail representation: `tags` are `{id, name}`
pub type BovidDetailResponse = BovidRepresentation<Tag>;

impl<T> BovidRepresentation<T> {
    pub fn new(bovid: Bovid, tags: Vec<T>, media: &MediaStorage) -> Self {
        Self {
            id: bovid.id,
            name: bovid.name,
            type_of_bovid: bovid.type_of_bovid,
            breed: bovid.breed,
            breeder: bovid.breeder,
            mothers_name: bovid.mothers_name,
            fathers_name: bovid.fathers_name,
            price: bovid
                .price
                .map(|p| p.with_scale(PRICE_DECIMAL_PLACES as i64).to_string()),
            date_of_birth: bovid.date_of_birth,
            date_of_death: bovid.date_of_death,
            date_of_purchase: bovid.date_of_purchase,
            date_sold: bovid.date_sold,
            tags,
            image: bovid.image.as_deref().map(|key| media.public_url(key)),
            created: bovid.created,
            updated: bovid.updated,
        }
    }
}

impl BovidResponse {
    pub fn from_bovid(bovid: Bovid, media: &MediaStorage) -> Self {
        let tags = bovid.tag_ids.clone();
        Self::new(bovid, tags, media)
    }
}

/// Response of the image upload action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BovidImageResponse {
    pub id: i64,
    pub image: Option<String>,
}
