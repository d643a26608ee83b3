use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use wayfare_core::location::{
    Location, LocationFilter, LocationImage, LocationType, LocationUpdate, LocationWithImages,
    NewLocation, NewLocationImage,
};
use wayfare_core::pagination::PageRequest;
use wayfare_core::repository::LocationStore;
use wayfare_core::{StoreError, StoreResult};

use crate::backend;

pub struct PgLocationStore {
    pool: PgPool,
}

impl PgLocationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct LocationRow {
    location_id: Uuid,
    name: String,
    description: Option<String>,
    location_type: String,
    location_url: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    image_url: Option<String>,
    thumbnail_url: Option<String>,
}

impl TryFrom<LocationRow> for Location {
    type Error = StoreError;

    fn try_from(row: LocationRow) -> Result<Self, StoreError> {
        let location_type =
            LocationType::parse(&row.location_type).ok_or_else(|| StoreError::Corrupt {
                column: "locations.location_type",
                value: row.location_type.clone(),
            })?;
        Ok(Location {
            location_id: row.location_id,
            name: row.name,
            description: row.description,
            location_type,
            location_url: row.location_url,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
            image_url: row.image_url,
            thumbnail_url: row.thumbnail_url,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ImageRow {
    image_id: Uuid,
    location_id: Uuid,
    image_url: String,
    thumbnail_url: Option<String>,
    display_order: i32,
    uploaded_at: DateTime<Utc>,
}

impl From<ImageRow> for LocationImage {
    fn from(row: ImageRow) -> Self {
        LocationImage {
            image_id: row.image_id,
            location_id: row.location_id,
            image_url: row.image_url,
            thumbnail_url: row.thumbnail_url,
            display_order: row.display_order,
            uploaded_at: row.uploaded_at,
        }
    }
}

const BASE_COLUMNS: &str = "location_id, name, description, location_type, location_url, \
     is_active, created_at, updated_at, NULL::TEXT AS image_url, NULL::TEXT AS thumbnail_url";

const FIRST_IMAGE_COLUMNS: &str = "l.location_id, l.name, l.description, l.location_type, l.location_url, \
     l.is_active, l.created_at, l.updated_at, \
     (SELECT image_url FROM location_images WHERE location_id = l.location_id \
        ORDER BY display_order ASC, uploaded_at ASC LIMIT 1) AS image_url, \
     (SELECT thumbnail_url FROM location_images WHERE location_id = l.location_id \
        ORDER BY display_order ASC, uploaded_at ASC LIMIT 1) AS thumbnail_url";

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &LocationFilter) {
    if let Some(is_active) = filter.is_active {
        builder.push(" AND l.is_active = ");
        builder.push_bind(is_active);
    }
    if let Some(location_type) = filter.location_type {
        builder.push(" AND l.location_type = ");
        builder.push_bind(location_type.as_str());
    }
    if let Some(search) = &filter.search {
        let term = format!("%{}%", search);
        builder.push(" AND (l.name ILIKE ");
        builder.push_bind(term.clone());
        builder.push(" OR l.description ILIKE ");
        builder.push_bind(term);
        builder.push(")");
    }
}

#[async_trait]
impl LocationStore for PgLocationStore {
    async fn find_by_id(&self, location_id: Uuid) -> StoreResult<Option<Location>> {
        let row = sqlx::query_as::<_, LocationRow>(&format!(
            "SELECT {BASE_COLUMNS} FROM locations WHERE location_id = $1"
        ))
        .bind(location_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(Location::try_from).transpose()
    }

    async fn find_with_images(&self, location_id: Uuid) -> StoreResult<Option<LocationWithImages>> {
        let Some(location) = self.find_by_id(location_id).await? else {
            return Ok(None);
        };

        let images: Vec<ImageRow> = sqlx::query_as(
            "SELECT image_id, location_id, image_url, thumbnail_url, display_order, uploaded_at \
             FROM location_images WHERE location_id = $1 \
             ORDER BY display_order ASC, uploaded_at ASC",
        )
        .bind(location_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(Some(LocationWithImages {
            location,
            images: images.into_iter().map(LocationImage::from).collect(),
        }))
    }

    async fn list(
        &self,
        filter: &LocationFilter,
        page: PageRequest,
    ) -> StoreResult<(Vec<Location>, i64)> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {FIRST_IMAGE_COLUMNS} FROM locations l WHERE 1=1"
        ));
        push_filters(&mut builder, filter);
        builder.push(" ORDER BY l.name ASC LIMIT ");
        builder.push_bind(page.limit);
        builder.push(" OFFSET ");
        builder.push_bind(page.offset());

        let rows: Vec<LocationRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        let mut count =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM locations l WHERE 1=1");
        push_filters(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;

        let locations = rows
            .into_iter()
            .map(Location::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((locations, total))
    }

    async fn create(&self, location: &NewLocation) -> StoreResult<Location> {
        let row = sqlx::query_as::<_, LocationRow>(&format!(
            "INSERT INTO locations (location_id, name, description, location_type, location_url) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {BASE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&location.name)
        .bind(&location.description)
        .bind(location.location_type.as_str())
        .bind(&location.location_url)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        row.try_into()
    }

    async fn update(
        &self,
        location_id: Uuid,
        update: &LocationUpdate,
    ) -> StoreResult<Option<Location>> {
        if update.name.is_none()
            && update.description.is_none()
            && update.location_type.is_none()
            && update.location_url.is_none()
            && update.is_active.is_none()
        {
            return self.find_by_id(location_id).await;
        }

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE locations SET ");
        let mut sets = builder.separated(", ");
        if let Some(name) = &update.name {
            sets.push("name = ");
            sets.push_bind_unseparated(name);
        }
        if let Some(description) = &update.description {
            sets.push("description = ");
            sets.push_bind_unseparated(description);
        }
        if let Some(location_type) = update.location_type {
            sets.push("location_type = ");
            sets.push_bind_unseparated(location_type.as_str());
        }
        if let Some(url) = &update.location_url {
            sets.push("location_url = ");
            sets.push_bind_unseparated(url);
        }
        if let Some(is_active) = update.is_active {
            sets.push("is_active = ");
            sets.push_bind_unseparated(is_active);
        }
        sets.push("updated_at = NOW()");
        builder.push(" WHERE location_id = ");
        builder.push_bind(location_id);
        builder.push(format!(" RETURNING {BASE_COLUMNS}"));

        let row: Option<LocationRow> = builder
            .build_query_as()
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        row.map(Location::try_from).transpose()
    }

    async fn delete(&self, location_id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM locations WHERE location_id = $1")
            .bind(location_id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_image(
        &self,
        location_id: Uuid,
        image: &NewLocationImage,
    ) -> StoreResult<LocationImage> {
        // Appended to the end of the gallery unless an order is given.
        let row = sqlx::query_as::<_, ImageRow>(
            "INSERT INTO location_images (image_id, location_id, image_url, thumbnail_url, display_order) \
             VALUES ($1, $2, $3, $4, COALESCE($5, \
                (SELECT COALESCE(MAX(display_order), -1) + 1 FROM location_images WHERE location_id = $2))) \
             RETURNING image_id, location_id, image_url, thumbnail_url, display_order, uploaded_at",
        )
        .bind(Uuid::new_v4())
        .bind(location_id)
        .bind(&image.image_url)
        .bind(&image.thumbnail_url)
        .bind(image.display_order)
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.into())
    }

    async fn delete_image(&self, location_id: Uuid, image_id: Uuid) -> StoreResult<bool> {
        let result =
            sqlx::query("DELETE FROM location_images WHERE image_id = $1 AND location_id = $2")
                .bind(image_id)
                .bind(location_id)
                .execute(&self.pool)
                .await
                .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn reorder_images(&self, location_id: Uuid, image_ids: &[Uuid]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(backend)?;

        for (order, image_id) in image_ids.iter().enumerate() {
            sqlx::query(
                "UPDATE location_images SET display_order = $1 \
                 WHERE image_id = $2 AND location_id = $3",
            )
            .bind(order as i32)
            .bind(image_id)
            .bind(location_id)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        }

        tx.commit().await.map_err(backend)?;
        Ok(())
    }
}
