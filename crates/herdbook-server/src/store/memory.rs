//! In-process backend
//!
//! All tables live in one [`MemoryTables`] value behind a single
//! `tokio::sync::RwLock`. Each write holds the lock for the whole operation,
//! which gives the same all-or-nothing behavior as a transaction.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tokio::sync::RwLock;

use super::{BovidFilter, EventFilter, HerdStore, StoreError, StoreResult, TagFilter};
use crate::models::{
    Bovid, BovidFields, LifeEvent, NewLifeEvent, NewUser, Tag, User, UserChanges, UserId,
};

#[derive(Debug, Default)]
struct MemoryTables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    /// key -> user id
    tokens: HashMap<String, UserId>,
    tags: BTreeMap<i64, Tag>,
    bovids: BTreeMap<i64, Bovid>,
    events: BTreeMap<i64, LifeEvent>,
}

impl MemoryTables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Owned subset of `ids`, sorted and de-duplicated
    fn owned_tag_ids(&self, owner: UserId, ids: &[i64]) -> Vec<i64> {
        ids.iter()
            .copied()
            .filter(|id| self.tags.get(id).is_some_and(|t| t.user_id == owner))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn owned_bovid(&mut self, owner: UserId, id: i64) -> Option<&mut Bovid> {
        self.bovids.get_mut(&id).filter(|b| b.user_id == owner)
    }
}

/// [`HerdStore`] kept entirely in memory
///
/// Ids come from one shared sequence, so ids are unique across tables.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<MemoryTables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn apply_fields(bovid: &mut Bovid, fields: BovidFields, tag_ids: Vec<i64>) {
    bovid.mothers_name = fields.mothers_name;
    bovid.fathers_name = fields.fathers_name;
    bovid.type_of_bovid = fields.type_of_bovid;
    bovid.breed = fields.breed;
    bovid.name = fields.name;
    bovid.breeder = fields.breeder;
    bovid.price = fields.price;
    bovid.date_of_birth = fields.date_of_birth;
    bovid.date_of_death = fields.date_of_death;
    bovid.date_of_purchase = fields.date_of_purchase;
    bovid.date_sold = fields.date_sold;
    bovid.tag_ids = tag_ids;
    bovid.updated = Utc::now();
}

#[async_trait]
impl HerdStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    // ------------------------------------------------------------------ users

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!("User '{}' already exists", user.email)));
        }

        let id = tables.next_id();
        let created = User {
            id,
            email: user.email,
            name: user.name,
            phone: user.phone,
            password_hash: user.password_hash,
            is_active: true,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            created: Utc::now(),
        };
        tables.users.insert(id, created.clone());
        Ok(created)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_token(&self, key: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tokens
            .get(key)
            .and_then(|id| tables.users.get(id))
            .cloned())
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found("User", id))?;

        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(phone) = changes.phone {
            user.phone = phone;
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        if let Some(active) = changes.is_active {
            user.is_active = active;
        }

        Ok(user.clone())
    }

    async fn get_or_create_token(&self, id: UserId, candidate: &str) -> StoreResult<String> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&id) {
            return Err(StoreError::not_found("User", id));
        }
        if let Some((key, _)) = tables.tokens.iter().find(|(_, owner)| **owner == id) {
            return Ok(key.clone());
        }

        tables.tokens.insert(candidate.to_string(), id);
        Ok(candidate.to_string())
    }

    // ------------------------------------------------------------------- tags

    async fn list_tags(&self, owner: UserId, filter: TagFilter) -> StoreResult<Vec<Tag>> {
        let tables = self.tables.read().await;

        let assigned: BTreeSet<i64> = tables
            .bovids
            .values()
            .filter(|b| b.user_id == owner)
            .flat_map(|b| b.tag_ids.iter().copied())
            .collect();

        let mut tags: Vec<Tag> = tables
            .tags
            .values()
            .filter(|t| t.user_id == owner)
            .filter(|t| !filter.assigned_only || assigned.contains(&t.id))
            .cloned()
            .collect();

        // Byte-wise, like `COLLATE "C"` in the Postgres backend
        tags.sort_by(|a, b| b.name.cmp(&a.name).then(b.id.cmp(&a.id)));
        Ok(tags)
    }

    async fn create_tag(&self, owner: UserId, name: &str) -> StoreResult<Tag> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let tag = Tag {
            id,
            name: name.to_string(),
            user_id: owner,
        };
        tables.tags.insert(id, tag.clone());
        Ok(tag)
    }

    async fn find_tags(&self, owner: UserId, ids: &[i64]) -> StoreResult<Vec<Tag>> {
        let tables = self.tables.read().await;
        Ok(tables
            .owned_tag_ids(owner, ids)
            .iter()
            .filter_map(|id| tables.tags.get(id).cloned())
            .collect())
    }

    // ----------------------------------------------------------------- bovids

    async fn list_bovids(&self, owner: UserId, filter: &BovidFilter) -> StoreResult<Vec<Bovid>> {
        let tables = self.tables.read().await;

        Ok(tables
            .bovids
            .values()
            .rev()
            .filter(|b| b.user_id == owner)
            .filter(|b| match &filter.tag_ids {
                Some(wanted) => b.tag_ids.iter().any(|id| wanted.contains(id)),
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn get_bovid(&self, owner: UserId, id: i64) -> StoreResult<Option<Bovid>> {
        let tables = self.tables.read().await;
        Ok(tables.bovids.get(&id).filter(|b| b.user_id == owner).cloned())
    }

    async fn create_bovid(&self, owner: UserId, fields: BovidFields) -> StoreResult<Bovid> {
        let mut tables = self.tables.write().await;

        let tag_ids = tables.owned_tag_ids(owner, &fields.tag_ids);
        let id = tables.next_id();
        let now = Utc::now();
        let mut bovid = Bovid {
            id,
            user_id: owner,
            mothers_name: String::new(),
            fathers_name: String::new(),
            type_of_bovid: String::new(),
            breed: String::new(),
            name: String::new(),
            breeder: String::new(),
            price: None,
            date_of_birth: None,
            date_of_death: None,
            date_of_purchase: None,
            date_sold: None,
            image: None,
            created: now,
            updated: now,
            tag_ids: Vec::new(),
        };
        apply_fields(&mut bovid, fields, tag_ids);
        bovid.updated = now;

        tables.bovids.insert(id, bovid.clone());
        Ok(bovid)
    }

    async fn update_bovid(
        &self,
        owner: UserId,
        id: i64,
        fields: BovidFields,
    ) -> StoreResult<Option<Bovid>> {
        let mut tables = self.tables.write().await;

        let tag_ids = tables.owned_tag_ids(owner, &fields.tag_ids);
        Ok(tables.owned_bovid(owner, id).map(|bovid| {
            apply_fields(bovid, fields, tag_ids);
            bovid.clone()
        }))
    }

    async fn set_bovid_image(
        &self,
        owner: UserId,
        id: i64,
        image: Option<String>,
    ) -> StoreResult<Option<Bovid>> {
        let mut tables = self.tables.write().await;
        Ok(tables.owned_bovid(owner, id).map(|bovid| {
            bovid.image = image;
            bovid.updated = Utc::now();
            bovid.clone()
        }))
    }

    async fn delete_bovid(&self, owner: UserId, id: i64) -> StoreResult<Option<Bovid>> {
        let mut tables = self.tables.write().await;

        if tables.owned_bovid(owner, id).is_none() {
            return Ok(None);
        }

        let removed = tables.bovids.remove(&id);
        tables.events.retain(|_, e| e.bovid_id != id);
        Ok(removed)
    }

    // ------------------------------------------------------------ life events

    async fn list_events(&self, owner: UserId, filter: EventFilter) -> StoreResult<Vec<LifeEvent>> {
        let tables = self.tables.read().await;
        Ok(tables
            .events
            .values()
            .filter(|e| e.user_id == owner)
            .filter(|e| filter.bovid_id.map_or(true, |id| e.bovid_id == id))
            .cloned()
            .collect())
    }

    async fn create_event(&self, owner: UserId, event: NewLifeEvent) -> StoreResult<LifeEvent> {
        let mut tables = self.tables.write().await;

        let owned = tables
            .bovids
            .get(&event.bovid_id)
            .is_some_and(|b| b.user_id == owner);
        if !owned {
            return Err(StoreError::not_found("Bovid", event.bovid_id));
        }

        let id = tables.next_id();
        let created = LifeEvent {
            id,
            bovid_id: event.bovid_id,
            user_id: owner,
            event_type: event.event_type,
            notes: event.notes,
            event_date: event.event_date,
            created: Utc::now(),
        };
        tables.events.insert(id, created.clone());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            name: String::new(),
            phone: None,
            password_hash: "hash".to_string(),
            is_staff: false,
            is_superuser: false,
        }
    }

    fn bovid_fields(name: &str, tag_ids: Vec<i64>) -> BovidFields {
        BovidFields {
            name: name.to_string(),
            type_of_bovid: "koei".to_string(),
            tag_ids,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.create_user(new_user("a@farm.io")).await.unwrap();
        let err = store.create_user(new_user("a@farm.io")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_token_is_reused() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("a@farm.io")).await.unwrap();

        let first = store.get_or_create_token(user.id, "k1").await.unwrap();
        let second = store.get_or_create_token(user.id, "k2").await.unwrap();
        assert_eq!(first, "k1");
        assert_eq!(second, "k1");

        let found = store.find_user_by_token("k1").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(store.find_user_by_token("k2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_tags_sorted_by_name_desc() {
        let store = MemoryStore::new();
        store.create_tag(1, "alpha").await.unwrap();
        store.create_tag(1, "charlie").await.unwrap();
        store.create_tag(1, "bravo").await.unwrap();
        store.create_tag(2, "zulu").await.unwrap();

        let names: Vec<_> = store
            .list_tags(1, TagFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["charlie", "bravo", "alpha"]);
    }

    #[tokio::test]
    async fn test_tags_sorted_bytewise_across_case() {
        let store = MemoryStore::new();
        for name in ["alpha", "Bravo", "charlie"] {
            store.create_tag(1, name).await.unwrap();
        }

        let names: Vec<_> = store
            .list_tags(1, TagFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["charlie", "alpha", "Bravo"]);
    }

    #[tokio::test]
    async fn test_assigned_only_lists_each_tag_once() {
        let store = MemoryStore::new();
        let shared = store.create_tag(1, "shared").await.unwrap();
        store.create_tag(1, "unused").await.unwrap();
        store.create_bovid(1, bovid_fields("one", vec![shared.id])).await.unwrap();
        store.create_bovid(1, bovid_fields("two", vec![shared.id])).await.unwrap();

        let tags = store
            .list_tags(1, TagFilter { assigned_only: true })
            .await
            .unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].id, shared.id);
    }

    #[tokio::test]
    async fn test_foreign_tags_are_not_linked() {
        let store = MemoryStore::new();
        let mine = store.create_tag(1, "mine").await.unwrap();
        let theirs = store.create_tag(2, "theirs").await.unwrap();

        let bovid = store
            .create_bovid(1, bovid_fields("one", vec![theirs.id, mine.id, mine.id]))
            .await
            .unwrap();
        assert_eq!(bovid.tag_ids, vec![mine.id]);
    }

    #[tokio::test]
    async fn test_bovid_tag_filter_and_order() {
        let store = MemoryStore::new();
        let t1 = store.create_tag(1, "t1").await.unwrap();
        let t2 = store.create_tag(1, "t2").await.unwrap();
        let t3 = store.create_tag(1, "t3").await.unwrap();
        let b1 = store.create_bovid(1, bovid_fields("b1", vec![t1.id, t2.id])).await.unwrap();
        let b2 = store.create_bovid(1, bovid_fields("b2", vec![t3.id])).await.unwrap();

        let all = store.list_bovids(1, &BovidFilter::default()).await.unwrap();
        assert_eq!(all.iter().map(|b| b.id).collect::<Vec<_>>(), vec![b2.id, b1.id]);

        let filtered = store
            .list_bovids(1, &BovidFilter { tag_ids: Some(vec![t1.id, t2.id]) })
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, b1.id);
    }

    #[tokio::test]
    async fn test_other_owner_cannot_touch_bovid() {
        let store = MemoryStore::new();
        let bovid = store.create_bovid(1, bovid_fields("b1", vec![])).await.unwrap();

        assert!(store.get_bovid(2, bovid.id).await.unwrap().is_none());
        assert!(store
            .update_bovid(2, bovid.id, bovid_fields("x", vec![]))
            .await
            .unwrap()
            .is_none());
        assert!(store.delete_bovid(2, bovid.id).await.unwrap().is_none());
        assert!(store.get_bovid(1, bovid.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_event_rejects_bovid_of_other_owner() {
        let store = MemoryStore::new();
        let theirs = store.create_bovid(2, bovid_fields("b2", vec![])).await.unwrap();

        let result = store
            .create_event(
                1,
                NewLifeEvent {
                    bovid_id: theirs.id,
                    event_type: "sold".to_string(),
                    notes: String::new(),
                    event_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                },
            )
            .await;

        assert!(matches!(result, Err(StoreError::NotFound(_))));
        assert!(store
            .list_events(2, EventFilter::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_delete_bovid_cascades_events() {
        let store = MemoryStore::new();
        let bovid = store.create_bovid(1, bovid_fields("b1", vec![])).await.unwrap();
        let other = store.create_bovid(1, bovid_fields("b2", vec![])).await.unwrap();
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();

        for bovid_id in [bovid.id, bovid.id, other.id] {
            store
                .create_event(
                    1,
                    NewLifeEvent {
                        bovid_id,
                        event_type: "inoculation".to_string(),
                        notes: String::new(),
                        event_date: date,
                    },
                )
                .await
                .unwrap();
        }

        store.delete_bovid(1, bovid.id).await.unwrap();

        let events = store.list_events(1, EventFilter::default()).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].bovid_id, other.id);
    }
}
