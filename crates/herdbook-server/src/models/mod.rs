//! Domain records
//!
//! Plain rows with explicit foreign-key fields. Ownership is always carried
//! as `user_id`; the Tag-Bovid relation lives in `bovid_tags` and is surfaced
//! on [`Bovid::tag_ids`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::types::BigDecimal;
use sqlx::FromRow;

pub mod user;

pub use user::{is_valid_email, normalize_email, NewUser, User, UserChanges};

/// Identifier of a user, used as the ownership scope for every resource
pub type UserId = i64;

/// User-defined label attachable to many bovids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    #[serde(skip)]
    pub user_id: UserId,
}

/// A tracked animal
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Bovid {
    pub id: i64,
    pub user_id: UserId,
    pub mothers_name: String,
    pub fathers_name: String,
    pub type_of_bovid: String,
    pub breed: String,
    pub name: String,
    pub breeder: String,
    pub price: Option<BigDecimal>,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
    pub date_of_purchase: Option<NaiveDate>,
    pub date_sold: Option<NaiveDate>,
    /// Media key of the stored photo
    pub image: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    /// Sorted ascending
    pub tag_ids: Vec<i64>,
}

/// Writable columns of a bovid
///
/// Both create and update write the full set; partial updates are merged
/// onto the existing row before reaching the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BovidFields {
    pub mothers_name: String,
    pub fathers_name: String,
    pub type_of_bovid: String,
    pub breed: String,
    pub name: String,
    pub breeder: String,
    pub price: Option<BigDecimal>,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
    pub date_of_purchase: Option<NaiveDate>,
    pub date_sold: Option<NaiveDate>,
    pub tag_ids: Vec<i64>,
}

impl From<&Bovid> for BovidFields {
    fn from(bovid: &Bovid) -> Self {
        Self {
            mothers_name: bovid.mothers_name.clone(),
            fathers_name: bovid.fathers_name.clone(),
            type_of_bovid: bovid.type_of_bovid.clone(),
            breed: bovid.breed.clone(),
            name: bovid.name.clone(),
            breeder: bovid.breeder.clone(),
            price: bovid.price.clone(),
            date_of_birth: bovid.date_of_birth,
            date_of_death: bovid.date_of_death,
            date_of_purchase: bovid.date_of_purchase,
            date_sold: bovid.date_sold,
            tag_ids: bovid.tag_ids.clone(),
        }
    }
}

/// A dated occurrence for one bovid
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct LifeEvent {
    pub id: i64,
    pub bovid_id: i64,
    pub user_id: UserId,
    pub event_type: String,
    pub notes: String,
    pub event_date: NaiveDate,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLifeEvent {
    pub bovid_id: i64,
    pub event_type: String,
    pub notes: String,
    pub event_date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_bovid_fields_from_bovid_copies_writable_columns() {
        let now = Utc::now();
        let bovid = Bovid {
            id: 9,
            user_id: 1,
            mothers_name: "bokkie".to_string(),
            fathers_name: "boelie".to_string(),
            type_of_bovid: "koei".to_string(),
            breed: "Nguni".to_string(),
            name: "kleintjie".to_string(),
            breeder: String::new(),
            price: Some(BigDecimal::from_str("5.00").unwrap()),
            date_of_birth: NaiveDate::from_ymd_opt(2019, 12, 1),
            date_of_death: None,
            date_of_purchase: None,
            date_sold: None,
            image: Some("images/a.png".to_string()),
            created: now,
            updated: now,
            tag_ids: vec![2, 3],
        };

        let fields = BovidFields::from(&bovid);
        assert_eq!(fields.name, "kleintjie");
        assert_eq!(fields.breed, "Nguni");
        assert_eq!(fields.tag_ids, vec![2, 3]);
        assert_eq!(fields.price, bovid.price);
        assert_eq!(fields.date_of_birth, bovid.date_of_birth);
    }
}
