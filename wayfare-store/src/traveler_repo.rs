use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use wayfare_core::pagination::PageRequest;
use wayfare_core::repository::TravelerStore;
use wayfare_core::traveler::{NewTraveler, Traveler, TravelerAccount, TravelerFilter, TravelerUpdate};
use wayfare_core::StoreResult;

use crate::backend;

pub struct PgTravelerStore {
    pool: PgPool,
}

impl PgTravelerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TravelerRow {
    traveler_id: Uuid,
    email: String,
    name: String,
    contact: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    last_login: Option<DateTime<Utc>>,
}

impl From<TravelerRow> for Traveler {
    fn from(row: TravelerRow) -> Self {
        Traveler {
            traveler_id: row.traveler_id,
            email: row.email,
            name: row.name,
            contact: row.contact,
            is_active: row.is_active,
            created_at: row.created_at,
            last_login: row.last_login,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TravelerAccountRow {
    traveler_id: Uuid,
    email: String,
    password_hash: String,
    name: String,
    contact: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    last_login: Option<DateTime<Utc>>,
}

impl From<TravelerAccountRow> for TravelerAccount {
    fn from(row: TravelerAccountRow) -> Self {
        TravelerAccount {
            traveler_id: row.traveler_id,
            email: row.email,
            password_hash: row.password_hash,
            name: row.name,
            contact: row.contact,
            is_active: row.is_active,
            created_at: row.created_at,
            last_login: row.last_login,
        }
    }
}

const TRAVELER_COLUMNS: &str =
    "traveler_id, email, name, contact, is_active, created_at, last_login";

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &TravelerFilter) {
    if let Some(is_active) = filter.is_active {
        builder.push(" AND is_active = ");
        builder.push_bind(is_active);
    }
    if let Some(search) = &filter.search {
        let term = format!("%{}%", search);
        builder.push(" AND (name ILIKE ");
        builder.push_bind(term.clone());
        builder.push(" OR email ILIKE ");
        builder.push_bind(term);
        builder.push(")");
    }
}

#[async_trait]
impl TravelerStore for PgTravelerStore {
    async fn find_by_id(&self, traveler_id: Uuid) -> StoreResult<Option<Traveler>> {
        let row = sqlx::query_as::<_, TravelerRow>(&format!(
            "SELECT {TRAVELER_COLUMNS} FROM travelers WHERE traveler_id = $1"
        ))
        .bind(traveler_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.map(Traveler::from))
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<TravelerAccount>> {
        // Case-insensitive, matching the unique index on LOWER(email).
        let row = sqlx::query_as::<_, TravelerAccountRow>(
            "SELECT traveler_id, email, password_hash, name, contact, is_active, created_at, last_login \
             FROM travelers WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.map(TravelerAccount::from))
    }

    async fn list(
        &self,
        filter: &TravelerFilter,
        page: PageRequest,
    ) -> StoreResult<(Vec<Traveler>, i64)> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {TRAVELER_COLUMNS} FROM travelers WHERE 1=1"
        ));
        push_filters(&mut builder, filter);
        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(page.limit);
        builder.push(" OFFSET ");
        builder.push_bind(page.offset());

        let rows: Vec<TravelerRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM travelers WHERE 1=1");
        push_filters(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;

        Ok((rows.into_iter().map(Traveler::from).collect(), total))
    }

    async fn create(&self, traveler: &NewTraveler) -> StoreResult<Traveler> {
        let row = sqlx::query_as::<_, TravelerRow>(&format!(
            "INSERT INTO travelers (traveler_id, email, password_hash, name, contact, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {TRAVELER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&traveler.email)
        .bind(&traveler.password_hash)
        .bind(&traveler.name)
        .bind(&traveler.contact)
        .bind(traveler.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.into())
    }

    async fn update(
        &self,
        traveler_id: Uuid,
        update: &TravelerUpdate,
    ) -> StoreResult<Option<Traveler>> {
        if update.name.is_none()
            && update.contact.is_none()
            && update.email.is_none()
            && update.is_active.is_none()
        {
            return self.find_by_id(traveler_id).await;
        }

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE travelers SET ");
        let mut sets = builder.separated(", ");
        if let Some(name) = &update.name {
            sets.push("name = ");
            sets.push_bind_unseparated(name);
        }
        if let Some(contact) = &update.contact {
            sets.push("contact = ");
            sets.push_bind_unseparated(contact);
        }
        if let Some(email) = &update.email {
            sets.push("email = ");
            sets.push_bind_unseparated(email);
        }
        if let Some(is_active) = update.is_active {
            sets.push("is_active = ");
            sets.push_bind_unseparated(is_active);
        }
        builder.push(" WHERE traveler_id = ");
        builder.push_bind(traveler_id);
        builder.push(format!(" RETURNING {TRAVELER_COLUMNS}"));

        let row: Option<TravelerRow> = builder
            .build_query_as()
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        Ok(row.map(Traveler::from))
    }

    async fn activate(&self, traveler_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE travelers SET is_active = TRUE WHERE traveler_id = $1")
            .bind(traveler_id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_password_hash(&self, traveler_id: Uuid, hash: &str) -> StoreResult<bool> {
        let result =
            sqlx::query("UPDATE travelers SET password_hash = $1 WHERE traveler_id = $2")
                .bind(hash)
                .bind(traveler_id)
                .execute(&self.pool)
                .await
                .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn touch_last_login(&self, traveler_id: Uuid) -> StoreResult<()> {
        sqlx::query("UPDATE travelers SET last_login = NOW() WHERE traveler_id = $1")
            .bind(traveler_id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn delete(&self, traveler_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM travelers WHERE traveler_id = $1")
            .bind(traveler_id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }
}
