use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use wayfare_core::package::{
    Itinerary, ItineraryItem, ItineraryLocation, ItineraryStop, NewPackage, Package,
    PackageFilter, PackageStatus, PackageUpdate, PackageWithItinerary,
};
use wayfare_core::pagination::PageRequest;
use wayfare_core::repository::PackageStore;
use wayfare_core::{StoreError, StoreResult};

use crate::backend;

pub struct PgPackageStore {
    pool: PgPool,
}

impl PgPackageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PackageRow {
    package_id: Uuid,
    title: String,
    description: Option<String>,
    no_of_days: i32,
    is_template: bool,
    status: String,
    is_active: bool,
    base_price: Option<f64>,
    created_by: Option<Uuid>,
    created_by_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PackageRow> for Package {
    type Error = StoreError;

    fn try_from(row: PackageRow) -> Result<Self, StoreError> {
        let status = PackageStatus::parse(&row.status).ok_or_else(|| StoreError::Corrupt {
            column: "packages.status",
            value: row.status.clone(),
        })?;
        Ok(Package {
            package_id: row.package_id,
            title: row.title,
            description: row.description,
            no_of_days: row.no_of_days,
            is_template: row.is_template,
            status,
            is_active: row.is_active,
            base_price: row.base_price,
            created_by: row.created_by,
            created_by_name: row.created_by_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ItineraryRow {
    id: Uuid,
    day_number: i32,
    visit_order: i32,
    notes: Option<String>,
    location_id: Uuid,
    location_name: String,
    location_description: Option<String>,
    location_type: String,
    location_url: Option<String>,
    image_url: Option<String>,
}

const PACKAGE_COLUMNS: &str = "p.package_id, p.title, p.description, p.no_of_days, p.is_template, \
     p.status, p.is_active, p.base_price, p.created_by, a.name AS created_by_name, \
     p.created_at, p.updated_at";

const PACKAGE_FROM: &str = "FROM packages p LEFT JOIN admins a ON p.created_by = a.admin_id";

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &PackageFilter) {
    if let Some(status) = filter.status {
        builder.push(" AND p.status = ");
        builder.push_bind(status.as_str());
    }
    if let Some(is_template) = filter.is_template {
        builder.push(" AND p.is_template = ");
        builder.push_bind(is_template);
    }
    if let Some(is_active) = filter.is_active {
        builder.push(" AND p.is_active = ");
        builder.push_bind(is_active);
    }
    if let Some(search) = &filter.search {
        let term = format!("%{}%", search);
        builder.push(" AND (p.title ILIKE ");
        builder.push_bind(term.clone());
        builder.push(" OR p.description ILIKE ");
        builder.push_bind(term);
        builder.push(")");
    }
}

#[async_trait]
impl PackageStore for PgPackageStore {
    async fn find_by_id(&self, package_id: Uuid) -> StoreResult<Option<Package>> {
        let row = sqlx::query_as::<_, PackageRow>(&format!(
            "SELECT {PACKAGE_COLUMNS} {PACKAGE_FROM} WHERE p.package_id = $1"
        ))
        .bind(package_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(Package::try_from).transpose()
    }

    async fn find_with_itinerary(
        &self,
        package_id: Uuid,
    ) -> StoreResult<Option<PackageWithItinerary>> {
        let Some(package) = self.find_by_id(package_id).await? else {
            return Ok(None);
        };

        let rows: Vec<ItineraryRow> = sqlx::query_as(
            "SELECT pl.id, pl.day_number, pl.visit_order, pl.notes, \
                    l.location_id, l.name AS location_name, \
                    l.description AS location_description, l.location_type, l.location_url, \
                    (SELECT image_url FROM location_images \
                       WHERE location_id = l.location_id \
                       ORDER BY display_order ASC LIMIT 1) AS image_url \
             FROM package_locations pl \
             INNER JOIN locations l ON pl.location_id = l.location_id \
             WHERE pl.package_id = $1 \
             ORDER BY pl.day_number ASC, pl.visit_order ASC",
        )
        .bind(package_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        let mut itinerary = Itinerary::new();
        for row in rows {
            itinerary
                .entry(row.day_number)
                .or_default()
                .push(ItineraryStop {
                    id: row.id,
                    visit_order: row.visit_order,
                    notes: row.notes,
                    location: ItineraryLocation {
                        location_id: row.location_id,
                        name: row.location_name,
                        description: row.location_description,
                        location_type: row.location_type,
                        location_url: row.location_url,
                        image_url: row.image_url,
                    },
                });
        }

        Ok(Some(PackageWithItinerary { package, itinerary }))
    }

    async fn list(
        &self,
        filter: &PackageFilter,
        page: PageRequest,
    ) -> StoreResult<(Vec<Package>, i64)> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {PACKAGE_COLUMNS} {PACKAGE_FROM} WHERE 1=1"
        ));
        push_filters(&mut builder, filter);
        builder.push(" ORDER BY p.created_at DESC LIMIT ");
        builder.push_bind(page.limit);
        builder.push(" OFFSET ");
        builder.push_bind(page.offset());

        let rows: Vec<PackageRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        let mut count =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM packages p WHERE 1=1");
        push_filters(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;

        let packages = rows
            .into_iter()
            .map(Package::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((packages, total))
    }

    async fn create(&self, package: &NewPackage) -> StoreResult<Package> {
        let package_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO packages (package_id, title, description, no_of_days, is_template, status, base_price, created_by) \
             VALUES ($1, $2, $3, $4, $5, 'draft', $6, $7)",
        )
        .bind(package_id)
        .bind(&package.title)
        .bind(&package.description)
        .bind(package.no_of_days)
        .bind(package.is_template)
        .bind(package.base_price)
        .bind(package.created_by)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        self.find_by_id(package_id)
            .await?
            .ok_or_else(|| StoreError::Corrupt {
                column: "packages.package_id",
                value: package_id.to_string(),
            })
    }

    async fn update(
        &self,
        package_id: Uuid,
        update: &PackageUpdate,
    ) -> StoreResult<Option<Package>> {
        if update.title.is_none()
            && update.description.is_none()
            && update.no_of_days.is_none()
            && update.is_template.is_none()
            && update.status.is_none()
            && update.is_active.is_none()
            && update.base_price.is_none()
        {
            return self.find_by_id(package_id).await;
        }

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE packages SET ");
        let mut sets = builder.separated(", ");
        if let Some(title) = &update.title {
            sets.push("title = ");
            sets.push_bind_unseparated(title);
        }
        if let Some(description) = &update.description {
            sets.push("description = ");
            sets.push_bind_unseparated(description);
        }
        if let Some(days) = update.no_of_days {
            sets.push("no_of_days = ");
            sets.push_bind_unseparated(days);
        }
        if let Some(is_template) = update.is_template {
            sets.push("is_template = ");
            sets.push_bind_unseparated(is_template);
        }
        if let Some(status) = update.status {
            sets.push("status = ");
            sets.push_bind_unseparated(status.as_str());
        }
        if let Some(is_active) = update.is_active {
            sets.push("is_active = ");
            sets.push_bind_unseparated(is_active);
        }
        if let Some(price) = update.base_price {
            sets.push("base_price = ");
            sets.push_bind_unseparated(price);
        }
        sets.push("updated_at = NOW()");
        builder.push(" WHERE package_id = ");
        builder.push_bind(package_id);

        let result = builder.build().execute(&self.pool).await.map_err(backend)?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find_by_id(package_id).await
    }

    async fn replace_itinerary(
        &self,
        package_id: Uuid,
        itinerary: &[ItineraryItem],
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        sqlx::query("DELETE FROM package_locations WHERE package_id = $1")
            .bind(package_id)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;

        for item in itinerary {
            sqlx::query(
                "INSERT INTO package_locations (id, package_id, location_id, day_number, visit_order, notes) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(Uuid::new_v4())
            .bind(package_id)
            .bind(item.location_id)
            .bind(item.day_number)
            .bind(item.visit_order)
            .bind(&item.notes)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        }

        tx.commit().await.map_err(backend)?;
        Ok(())
    }

    async fn publish(&self, package_id: Uuid) -> StoreResult<bool> {
        let result =
            sqlx::query("UPDATE packages SET status = 'published', updated_at = NOW() WHERE package_id = $1")
                .bind(package_id)
                .execute(&self.pool)
                .await
                .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn unpublish(&self, package_id: Uuid) -> StoreResult<bool> {
        let result =
            sqlx::query("UPDATE packages SET status = 'draft', updated_at = NOW() WHERE package_id = $1")
                .bind(package_id)
                .execute(&self.pool)
                .await
                .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn duplicate(
        &self,
        package_id: Uuid,
        new_title: Option<&str>,
        created_by: Uuid,
    ) -> StoreResult<Option<Uuid>> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        let new_id = Uuid::new_v4();
        // Clone as a draft under the acting admin; fall back to
        // "<title> (Copy)" when no new title was given.
        let copied = sqlx::query(
            "INSERT INTO packages (package_id, title, description, no_of_days, is_template, status, base_price, created_by) \
             SELECT $1, COALESCE($2, title || ' (Copy)'), description, no_of_days, is_template, 'draft', base_price, $3 \
             FROM packages WHERE package_id = $4",
        )
        .bind(new_id)
        .bind(new_title)
        .bind(created_by)
        .bind(package_id)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        if copied.rows_affected() == 0 {
            tx.rollback().await.map_err(backend)?;
            return Ok(None);
        }

        sqlx::query(
            "INSERT INTO package_locations (id, package_id, location_id, day_number, visit_order, notes) \
             SELECT gen_random_uuid(), $1, location_id, day_number, visit_order, notes \
             FROM package_locations WHERE package_id = $2",
        )
        .bind(new_id)
        .bind(package_id)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;

        tx.commit().await.map_err(backend)?;
        Ok(Some(new_id))
    }

    async fn delete(&self, package_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM packages WHERE package_id = $1")
            .bind(package_id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }
}
