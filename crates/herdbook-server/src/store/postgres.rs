//! PostgreSQL backend
//!
//! Queries are built at runtime with `sqlx::query_as` so the crate builds
//! without a live database. Bovid rows are always read through
//! [`BOVID_SELECT`], which folds the `bovid_tags` join into a sorted
//! `tag_ids` array.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::{BovidFilter, EventFilter, HerdStore, StoreError, StoreResult, TagFilter};
use crate::models::{
    Bovid, BovidFields, LifeEvent, NewLifeEvent, NewUser, Tag, User, UserChanges, UserId,
};

const USER_COLUMNS: &str =
    "u.id, u.email, u.name, u.phone, u.password_hash, u.is_active, u.is_staff, u.is_superuser, u.created";

const BOVID_SELECT: &str = r#"
    SELECT b.id, b.user_id, b.mothers_name, b.fathers_name, b.type_of_bovid, b.breed,
           b.name, b.breeder, b.price, b.date_of_birth, b.date_of_death,
           b.date_of_purchase, b.date_sold, b.image, b.created, b.updated,
           COALESCE(
               array_agg(bt.tag_id ORDER BY bt.tag_id) FILTER (WHERE bt.tag_id IS NOT NULL),
               '{}'
           ) AS tag_ids
    FROM bovids b
    LEFT JOIN bovid_tags bt ON bt.bovid_id = b.id
"#;

const EVENT_COLUMNS: &str = "id, bovid_id, user_id, event_type, notes, event_date, created";

/// sqlx-backed [`HerdStore`]
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the workspace migrations
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    async fn fetch_bovid(
        tx: &mut Transaction<'_, Postgres>,
        owner: UserId,
        id: i64,
    ) -> StoreResult<Option<Bovid>> {
        let sql = format!("{BOVID_SELECT} WHERE b.user_id = $1 AND b.id = $2 GROUP BY b.id");
        let bovid = sqlx::query_as::<_, Bovid>(&sql)
            .bind(owner)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(bovid)
    }

    /// Replace the tag links of a bovid, silently dropping tags of other owners
    async fn write_tag_links(
        tx: &mut Transaction<'_, Postgres>,
        owner: UserId,
        bovid_id: i64,
        tag_ids: &[i64],
    ) -> StoreResult<()> {
        sqlx::query("DELETE FROM bovid_tags WHERE bovid_id = $1")
            .bind(bovid_id)
            .execute(&mut **tx)
            .await?;

        if !tag_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO bovid_tags (bovid_id, tag_id)
                SELECT $1, t.id FROM tags t
                WHERE t.id = ANY($2) AND t.user_id = $3
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(bovid_id)
            .bind(tag_ids)
            .bind(owner)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}

fn map_unique_violation(error: sqlx::Error, message: impl Into<String>) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = error {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(message.into());
        }
    }
    StoreError::Sqlx(error)
}

#[async_trait]
impl HerdStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // ------------------------------------------------------------------ users

    #[tracing::instrument(skip(self, user), fields(email = %user.email))]
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, phone, password_hash, is_staff, is_superuser)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, email, name, phone, password_hash, is_active, is_staff, is_superuser, created
            "#,
        )
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, format!("User '{}' already exists", user.email)))?;

        Ok(created)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.email = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_token(&self, key: &str) -> StoreResult<Option<User>> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users u JOIN auth_tokens t ON t.user_id = u.id WHERE t.key = $1"
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    #[tracing::instrument(skip(self, changes))]
    async fn update_user(&self, id: UserId, changes: UserChanges) -> StoreResult<User> {
        let (set_phone, phone) = match changes.phone {
            Some(phone) => (true, phone),
            None => (false, None),
        };

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                phone = CASE WHEN $3 THEN $4 ELSE phone END,
                password_hash = COALESCE($5, password_hash),
                is_active = COALESCE($6, is_active)
            WHERE id = $1
            RETURNING id, email, name, phone, password_hash, is_active, is_staff, is_superuser, created
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(set_phone)
        .bind(phone)
        .bind(changes.password_hash)
        .bind(changes.is_active)
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or_else(|| StoreError::not_found("User", id))
    }

    async fn get_or_create_token(&self, id: UserId, candidate: &str) -> StoreResult<String> {
        // The no-op update makes RETURNING yield the existing key on conflict
        let key: String = sqlx::query_scalar(
            r#"
            INSERT INTO auth_tokens (key, user_id) VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING key
            "#,
        )
        .bind(candidate)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(key)
    }

    // ------------------------------------------------------------------- tags

    async fn list_tags(&self, owner: UserId, filter: TagFilter) -> StoreResult<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.name, t.user_id
            FROM tags t
            WHERE t.user_id = $1
              AND (NOT $2 OR EXISTS (
                  SELECT 1 FROM bovid_tags bt
                  JOIN bovids b ON b.id = bt.bovid_id
                  WHERE bt.tag_id = t.id AND b.user_id = $1
              ))
            ORDER BY t.name COLLATE "C" DESC, t.id DESC
            "#,
        )
        .bind(owner)
        .bind(filter.assigned_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    async fn create_tag(&self, owner: UserId, name: &str) -> StoreResult<Tag> {
        let tag = sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (name, user_id) VALUES ($1, $2) RETURNING id, name, user_id",
        )
        .bind(name)
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;

        Ok(tag)
    }

    async fn find_tags(&self, owner: UserId, ids: &[i64]) -> StoreResult<Vec<Tag>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let tags = sqlx::query_as::<_, Tag>(
            "SELECT id, name, user_id FROM tags WHERE user_id = $1 AND id = ANY($2) ORDER BY id",
        )
        .bind(owner)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(tags)
    }

    // ----------------------------------------------------------------- bovids

    async fn list_bovids(&self, owner: UserId, filter: &BovidFilter) -> StoreResult<Vec<Bovid>> {
        let sql = format!(
            r#"{BOVID_SELECT}
            WHERE b.user_id = $1
              AND ($2::bigint[] IS NULL OR EXISTS (
                  SELECT 1 FROM bovid_tags f WHERE f.bovid_id = b.id AND f.tag_id = ANY($2)
              ))
            GROUP BY b.id
            ORDER BY b.id DESC"#
        );

        let bovids = sqlx::query_as::<_, Bovid>(&sql)
            .bind(owner)
            .bind(filter.tag_ids.as_deref())
            .fetch_all(&self.pool)
            .await?;

        Ok(bovids)
    }

    async fn get_bovid(&self, owner: UserId, id: i64) -> StoreResult<Option<Bovid>> {
        let mut tx = self.pool.begin().await?;
        let bovid = Self::fetch_bovid(&mut tx, owner, id).await?;
        tx.commit().await?;
        Ok(bovid)
    }

    #[tracing::instrument(skip(self, fields), fields(name = %fields.name))]
    async fn create_bovid(&self, owner: UserId, fields: BovidFields) -> StoreResult<Bovid> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO bovids (
                mothers_name, fathers_name, type_of_bovid, breed, name, breeder, price,
                date_of_birth, date_of_death, date_of_purchase, date_sold, user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            "#,
        )
        .bind(&fields.mothers_name)
        .bind(&fields.fathers_name)
        .bind(&fields.type_of_bovid)
        .bind(&fields.breed)
        .bind(&fields.name)
        .bind(&fields.breeder)
        .bind(&fields.price)
        .bind(fields.date_of_birth)
        .bind(fields.date_of_death)
        .bind(fields.date_of_purchase)
        .bind(fields.date_sold)
        .bind(owner)
        .fetch_one(&mut *tx)
        .await?;

        Self::write_tag_links(&mut tx, owner, id, &fields.tag_ids).await?;

        let bovid = Self::fetch_bovid(&mut tx, owner, id)
            .await?
            .ok_or_else(|| StoreError::not_found("Bovid", id))?;

        tx.commit().await?;
        Ok(bovid)
    }

    #[tracing::instrument(skip(self, fields))]
    async fn update_bovid(
        &self,
        owner: UserId,
        id: i64,
        fields: BovidFields,
    ) -> StoreResult<Option<Bovid>> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE bovids SET
                mothers_name = $3, fathers_name = $4, type_of_bovid = $5, breed = $6,
                name = $7, breeder = $8, price = $9, date_of_birth = $10,
                date_of_death = $11, date_of_purchase = $12, date_sold = $13,
                updated = NOW()
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(&fields.mothers_name)
        .bind(&fields.fathers_name)
        .bind(&fields.type_of_bovid)
        .bind(&fields.breed)
        .bind(&fields.name)
        .bind(&fields.breeder)
        .bind(&fields.price)
        .bind(fields.date_of_birth)
        .bind(fields.date_of_death)
        .bind(fields.date_of_purchase)
        .bind(fields.date_sold)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        Self::write_tag_links(&mut tx, owner, id, &fields.tag_ids).await?;
        let bovid = Self::fetch_bovid(&mut tx, owner, id).await?;

        tx.commit().await?;
        Ok(bovid)
    }

    async fn set_bovid_image(
        &self,
        owner: UserId,
        id: i64,
        image: Option<String>,
    ) -> StoreResult<Option<Bovid>> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE bovids SET image = $3, updated = NOW() WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(owner)
        .bind(image)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(None);
        }

        let bovid = Self::fetch_bovid(&mut tx, owner, id).await?;
        tx.commit().await?;
        Ok(bovid)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_bovid(&self, owner: UserId, id: i64) -> StoreResult<Option<Bovid>> {
        let mut tx = self.pool.begin().await?;

        let Some(bovid) = Self::fetch_bovid(&mut tx, owner, id).await? else {
            return Ok(None);
        };

        // bovid_tags and life_events cascade
        sqlx::query("DELETE FROM bovids WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(bovid))
    }

    // ------------------------------------------------------------ life events

    async fn list_events(&self, owner: UserId, filter: EventFilter) -> StoreResult<Vec<LifeEvent>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM life_events \
             WHERE user_id = $1 AND ($2::bigint IS NULL OR bovid_id = $2) \
             ORDER BY id"
        );

        let events = sqlx::query_as::<_, LifeEvent>(&sql)
            .bind(owner)
            .bind(filter.bovid_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    async fn create_event(&self, owner: UserId, event: NewLifeEvent) -> StoreResult<LifeEvent> {
        // Inserts nothing unless the bovid belongs to the owner
        let sql = format!(
            "INSERT INTO life_events (bovid_id, event_type, notes, event_date, user_id) \
             SELECT b.id, $2::text, $3::text, $4::date, b.user_id FROM bovids b WHERE b.id = $1 AND b.user_id = $5 \
             RETURNING {EVENT_COLUMNS}"
        );

        sqlx::query_as::<_, LifeEvent>(&sql)
            .bind(event.bovid_id)
            .bind(&event.event_type)
            .bind(&event.notes)
            .bind(event.event_date)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("Bovid", event.bovid_id))
    }
}
