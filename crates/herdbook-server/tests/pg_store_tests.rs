//! Postgres backend tests
//!
//! Need a running server: set `TEST_DATABASE_URL` and run
//! `cargo test -- --ignored`.

use herdbook_server::{
    models::{BovidFields, NewLifeEvent, NewUser},
    store::{BovidFilter, EventFilter, HerdStore, StoreError, TagFilter},
};
use chrono::NaiveDate;
use sqlx::types::BigDecimal;
use std::str::FromStr;

mod helpers;
use helpers::TestDb;

fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        name: "Test".to_string(),
        phone: None,
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        is_staff: false,
        is_superuser: false,
    }
}

fn bovid(name: &str, tag_ids: Vec<i64>) -> BovidFields {
    BovidFields {
        name: name.to_string(),
        type_of_bovid: "cow".to_string(),
        tag_ids,
        ..Default::default()
    }
}

#[tokio::test]
#[ignore]
async fn test_users_and_tokens() {
    let db = TestDb::new().await;
    let store = db.store();

    store.ping().await.unwrap();
    let user = store.create_user(new_user("a@farm.io")).await.unwrap();
    assert!(user.is_active);

    let err = store.create_user(new_user("a@farm.io")).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    let key = store.get_or_create_token(user.id, "k".repeat(40).as_str()).await.unwrap();
    let again = store.get_or_create_token(user.id, "j".repeat(40).as_str()).await.unwrap();
    assert_eq!(key, again);

    let found = store.find_user_by_token(&key).await.unwrap().unwrap();
    assert_eq!(found.id, user.id);
}

#[tokio::test]
#[ignore]
async fn test_bovid_crud_with_tags() {
    let db = TestDb::new().await;
    let store = db.store();
    let owner = store.create_user(new_user("a@farm.io")).await.unwrap().id;
    let other = store.create_user(new_user("b@farm.io")).await.unwrap().id;

    let t1 = store.create_tag(owner, "T1").await.unwrap();
    let t2 = store.create_tag(owner, "T2").await.unwrap();
    let foreign = store.create_tag(other, "Theirs").await.unwrap();

    let mut fields = bovid("Bessie", vec![t2.id, t1.id, foreign.id]);
    fields.price = Some(BigDecimal::from_str("5.00").unwrap());
    fields.date_of_birth = NaiveDate::from_ymd_opt(2019, 12, 1);
    let created = store.create_bovid(owner, fields).await.unwrap();

    // Foreign tags are never linked
    assert_eq!(created.tag_ids, vec![t1.id, t2.id]);
    assert_eq!(created.price, Some(BigDecimal::from_str("5.00").unwrap()));

    assert!(store.get_bovid(other, created.id).await.unwrap().is_none());

    let updated = store
        .update_bovid(owner, created.id, bovid("Bess", vec![t1.id]))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "Bess");
    assert_eq!(updated.tag_ids, vec![t1.id]);
    assert_eq!(updated.created, created.created);
    assert!(updated.updated >= created.updated);

    let with_image = store
        .set_bovid_image(owner, created.id, Some("images/a.png".to_string()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(with_image.image.as_deref(), Some("images/a.png"));
}

#[tokio::test]
#[ignore]
async fn test_filters_and_ordering() {
    let db = TestDb::new().await;
    let store = db.store();
    let owner = store.create_user(new_user("a@farm.io")).await.unwrap().id;

    let t1 = store.create_tag(owner, "Alpha").await.unwrap();
    let t2 = store.create_tag(owner, "Beta").await.unwrap();
    let t3 = store.create_tag(owner, "Gamma").await.unwrap();
    let b1 = store.create_bovid(owner, bovid("One", vec![t1.id, t2.id])).await.unwrap();
    let b2 = store.create_bovid(owner, bovid("Two", vec![t3.id])).await.unwrap();
    store.create_bovid(owner, bovid("Three", vec![t1.id])).await.unwrap();

    let names: Vec<_> = store
        .list_tags(owner, TagFilter::default())
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, ["Gamma", "Beta", "Alpha"]);

    let assigned = store
        .list_tags(owner, TagFilter { assigned_only: true })
        .await
        .unwrap();
    assert_eq!(assigned.len(), 3);
    assert_eq!(assigned.iter().filter(|t| t.id == t1.id).count(), 1);

    let filtered = store
        .list_bovids(owner, &BovidFilter { tag_ids: Some(vec![t2.id, t3.id]) })
        .await
        .unwrap();
    let ids: Vec<_> = filtered.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![b2.id, b1.id]);
}

#[tokio::test]
#[ignore]
async fn test_tag_order_matches_memory_store_across_case() {
    let db = TestDb::new().await;
    let store = db.store();
    let owner = store.create_user(new_user("a@farm.io")).await.unwrap().id;
    for name in ["alpha", "Bravo", "charlie"] {
        store.create_tag(owner, name).await.unwrap();
    }

    let names: Vec<_> = store
        .list_tags(owner, TagFilter::default())
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, ["charlie", "alpha", "Bravo"]);
}

#[tokio::test]
#[ignore]
async fn test_delete_cascades_events() {
    let db = TestDb::new().await;
    let store = db.store();
    let owner = store.create_user(new_user("a@farm.io")).await.unwrap().id;
    let cow = store.create_bovid(owner, bovid("Bessie", vec![])).await.unwrap();

    for event_type in ["Birth", "Inoculation"] {
        store
            .create_event(
                owner,
                NewLifeEvent {
                    bovid_id: cow.id,
                    event_type: event_type.to_string(),
                    notes: String::new(),
                    event_date: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
                },
            )
            .await
            .unwrap();
    }
    assert_eq!(store.list_events(owner, EventFilter::default()).await.unwrap().len(), 2);

    let removed = store.delete_bovid(owner, cow.id).await.unwrap();
    assert!(removed.is_some());
    assert!(store.list_events(owner, EventFilter::default()).await.unwrap().is_empty());
    assert!(store.delete_bovid(owner, cow.id).await.unwrap().is_none());
}
