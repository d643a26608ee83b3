use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use wayfare_core::admin::{Admin, AdminAccount, AdminUpdate, NewAdmin};
use wayfare_core::pagination::PageRequest;
use wayfare_core::repository::AdminStore;
use wayfare_core::StoreResult;

use crate::backend;

pub struct PgAdminStore {
    pool: PgPool,
}

impl PgAdminStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AdminRow {
    admin_id: Uuid,
    email: String,
    name: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    last_login: Option<DateTime<Utc>>,
}

impl From<AdminRow> for Admin {
    fn from(row: AdminRow) -> Self {
        Admin {
            admin_id: row.admin_id,
            email: row.email,
            name: row.name,
            is_active: row.is_active,
            created_at: row.created_at,
            last_login: row.last_login,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AdminAccountRow {
    admin_id: Uuid,
    email: String,
    password_hash: String,
    name: String,
    is_active: bool,
    last_login: Option<DateTime<Utc>>,
}

const ADMIN_COLUMNS: &str = "admin_id, email, name, is_active, created_at, last_login";

#[async_trait]
impl AdminStore for PgAdminStore {
    async fn find_by_id(&self, admin_id: Uuid) -> StoreResult<Option<Admin>> {
        let row = sqlx::query_as::<_, AdminRow>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE admin_id = $1"
        ))
        .bind(admin_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.map(Admin::from))
    }

    async fn find_account_by_email(&self, email: &str) -> StoreResult<Option<AdminAccount>> {
        let row = sqlx::query_as::<_, AdminAccountRow>(
            "SELECT admin_id, email, password_hash, name, is_active, last_login \
             FROM admins WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.map(|r| AdminAccount {
            admin_id: r.admin_id,
            email: r.email,
            password_hash: r.password_hash,
            name: r.name,
            is_active: r.is_active,
            last_login: r.last_login,
        }))
    }

    async fn list(&self, page: PageRequest) -> StoreResult<(Vec<Admin>, i64)> {
        let rows = sqlx::query_as::<_, AdminRow>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(page.limit)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;

        Ok((rows.into_iter().map(Admin::from).collect(), total))
    }

    async fn create(&self, admin: &NewAdmin) -> StoreResult<Admin> {
        let row = sqlx::query_as::<_, AdminRow>(&format!(
            "INSERT INTO admins (admin_id, email, password_hash, name) \
             VALUES ($1, $2, $3, $4) RETURNING {ADMIN_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&admin.email)
        .bind(&admin.password_hash)
        .bind(&admin.name)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.into())
    }

    async fn update(&self, admin_id: Uuid, update: &AdminUpdate) -> StoreResult<Option<Admin>> {
        if update.name.is_none() && update.email.is_none() && update.is_active.is_none() {
            return self.find_by_id(admin_id).await;
        }

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE admins SET ");
        let mut sets = builder.separated(", ");
        if let Some(name) = &update.name {
            sets.push("name = ");
            sets.push_bind_unseparated(name);
        }
        if let Some(email) = &update.email {
            sets.push("email = ");
            sets.push_bind_unseparated(email);
        }
        if let Some(is_active) = update.is_active {
            sets.push("is_active = ");
            sets.push_bind_unseparated(is_active);
        }
        builder.push(" WHERE admin_id = ");
        builder.push_bind(admin_id);
        builder.push(format!(" RETURNING {ADMIN_COLUMNS}"));

        let row: Option<AdminRow> = builder
            .build_query_as()
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        Ok(row.map(Admin::from))
    }

    async fn set_password_hash(&self, admin_id: Uuid, hash: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE admins SET password_hash = $1 WHERE admin_id = $2")
            .bind(hash)
            .bind(admin_id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn touch_last_login(&self, admin_id: Uuid) -> StoreResult<()> {
        sqlx::query("UPDATE admins SET last_login = NOW() WHERE admin_id = $1")
            .bind(admin_id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn delete(&self, admin_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM admins WHERE admin_id = $1")
            .bind(admin_id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }
}
