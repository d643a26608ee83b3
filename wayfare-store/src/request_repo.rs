use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use wayfare_core::pagination::PageRequest;
use wayfare_core::repository::RequestStore;
use wayfare_core::request::{
    NewPackageRequest, PackageRequest, RequestFilter, RequestStats, RequestStatus,
};
use wayfare_core::{StoreError, StoreResult};

use crate::backend;

pub struct PgRequestStore {
    pool: PgPool,
}

impl PgRequestStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RequestRow {
    request_id: Uuid,
    traveler_id: Uuid,
    title: String,
    description: String,
    no_of_days: i32,
    no_of_travelers: i32,
    preferred_start_date: Option<NaiveDate>,
    budget_range: Option<String>,
    special_requirements: Option<String>,
    status: String,
    admin_notes: Option<String>,
    reviewed_by: Option<Uuid>,
    reviewed_by_name: Option<String>,
    created_package_id: Option<Uuid>,
    created_package_title: Option<String>,
    traveler_name: String,
    traveler_email: String,
    traveler_contact: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RequestRow> for PackageRequest {
    type Error = StoreError;

    fn try_from(row: RequestRow) -> Result<Self, StoreError> {
        let status = RequestStatus::parse(&row.status).ok_or_else(|| StoreError::Corrupt {
            column: "package_requests.status",
            value: row.status.clone(),
        })?;
        Ok(PackageRequest {
            request_id: row.request_id,
            traveler_id: row.traveler_id,
            title: row.title,
            description: row.description,
            no_of_days: row.no_of_days,
            no_of_travelers: row.no_of_travelers,
            preferred_start_date: row.preferred_start_date,
            budget_range: row.budget_range,
            special_requirements: row.special_requirements,
            status,
            admin_notes: row.admin_notes,
            reviewed_by: row.reviewed_by,
            reviewed_by_name: row.reviewed_by_name,
            created_package_id: row.created_package_id,
            created_package_title: row.created_package_title,
            traveler_name: row.traveler_name,
            traveler_email: row.traveler_email,
            traveler_contact: row.traveler_contact,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RequestStatsRow {
    total_requests: i64,
    pending_requests: i64,
    reviewing_requests: i64,
    approved_requests: i64,
    rejected_requests: i64,
}

const REQUEST_SELECT: &str = "SELECT pr.request_id, pr.traveler_id, pr.title, pr.description, \
       pr.no_of_days, pr.no_of_travelers, pr.preferred_start_date, pr.budget_range, \
       pr.special_requirements, pr.status, pr.admin_notes, pr.reviewed_by, \
       a.name AS reviewed_by_name, pr.created_package_id, p.title AS created_package_title, \
       t.name AS traveler_name, t.email AS traveler_email, t.contact AS traveler_contact, \
       pr.created_at, pr.updated_at \
     FROM package_requests pr \
     INNER JOIN travelers t ON pr.traveler_id = t.traveler_id \
     LEFT JOIN admins a ON pr.reviewed_by = a.admin_id \
     LEFT JOIN packages p ON pr.created_package_id = p.package_id \
     WHERE 1=1";

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &RequestFilter) {
    if let Some(status) = filter.status {
        builder.push(" AND pr.status = ");
        builder.push_bind(status.as_str());
    }
    if let Some(traveler_id) = filter.traveler_id {
        builder.push(" AND pr.traveler_id = ");
        builder.push_bind(traveler_id);
    }
    if let Some(search) = &filter.search {
        let term = format!("%{}%", search);
        builder.push(" AND (pr.title ILIKE ");
        builder.push_bind(term.clone());
        builder.push(" OR pr.description ILIKE ");
        builder.push_bind(term);
        builder.push(")");
    }
}

#[async_trait]
impl RequestStore for PgRequestStore {
    async fn find_by_id(&self, request_id: Uuid) -> StoreResult<Option<PackageRequest>> {
        let mut builder = QueryBuilder::<Postgres>::new(REQUEST_SELECT);
        builder.push(" AND pr.request_id = ");
        builder.push_bind(request_id);

        let row: Option<RequestRow> = builder
            .build_query_as()
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        row.map(PackageRequest::try_from).transpose()
    }

    async fn list(
        &self,
        filter: &RequestFilter,
        page: PageRequest,
    ) -> StoreResult<(Vec<PackageRequest>, i64)> {
        let mut builder = QueryBuilder::<Postgres>::new(REQUEST_SELECT);
        push_filters(&mut builder, filter);
        builder.push(" ORDER BY pr.created_at DESC LIMIT ");
        builder.push_bind(page.limit);
        builder.push(" OFFSET ");
        builder.push_bind(page.offset());

        let rows: Vec<RequestRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM package_requests pr \
             INNER JOIN travelers t ON pr.traveler_id = t.traveler_id \
             WHERE 1=1",
        );
        push_filters(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;

        let requests = rows
            .into_iter()
            .map(PackageRequest::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((requests, total))
    }

    async fn list_for_traveler(&self, traveler_id: Uuid) -> StoreResult<Vec<PackageRequest>> {
        let mut builder = QueryBuilder::<Postgres>::new(REQUEST_SELECT);
        builder.push(" AND pr.traveler_id = ");
        builder.push_bind(traveler_id);
        builder.push(" ORDER BY pr.created_at DESC");

        let rows: Vec<RequestRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        rows.into_iter().map(PackageRequest::try_from).collect()
    }

    async fn create(&self, request: &NewPackageRequest) -> StoreResult<Uuid> {
        let request_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO package_requests (request_id, traveler_id, title, description, \
                no_of_days, no_of_travelers, preferred_start_date, budget_range, special_requirements) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(request_id)
        .bind(request.traveler_id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.no_of_days)
        .bind(request.no_of_travelers)
        .bind(request.preferred_start_date)
        .bind(&request.budget_range)
        .bind(&request.special_requirements)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(request_id)
    }

    async fn set_status(
        &self,
        request_id: Uuid,
        status: RequestStatus,
        admin_notes: Option<&str>,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE package_requests \
             SET status = $1, admin_notes = COALESCE($2, admin_notes), updated_at = NOW() \
             WHERE request_id = $3",
        )
        .bind(status.as_str())
        .bind(admin_notes)
        .bind(request_id)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn approve(
        &self,
        request_id: Uuid,
        admin_id: Uuid,
        package_id: Option<Uuid>,
        admin_notes: Option<&str>,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE package_requests \
             SET status = 'approved', reviewed_by = $1, created_package_id = $2, \
                 admin_notes = COALESCE($3, admin_notes), updated_at = NOW() \
             WHERE request_id = $4",
        )
        .bind(admin_id)
        .bind(package_id)
        .bind(admin_notes)
        .bind(request_id)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn reject(
        &self,
        request_id: Uuid,
        admin_id: Uuid,
        admin_notes: Option<&str>,
    ) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE package_requests \
             SET status = 'rejected', reviewed_by = $1, \
                 admin_notes = COALESCE($2, admin_notes), updated_at = NOW() \
             WHERE request_id = $3",
        )
        .bind(admin_id)
        .bind(admin_notes)
        .bind(request_id)
        .execute(&self.pool)
        .await
        .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn stats(&self) -> StoreResult<RequestStats> {
        let row = sqlx::query_as::<_, RequestStatsRow>(
            "SELECT \
               COUNT(*) AS total_requests, \
               COUNT(*) FILTER (WHERE status = 'pending') AS pending_requests, \
               COUNT(*) FILTER (WHERE status = 'reviewing') AS reviewing_requests, \
               COUNT(*) FILTER (WHERE status = 'approved') AS approved_requests, \
               COUNT(*) FILTER (WHERE status = 'rejected') AS rejected_requests \
             FROM package_requests",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        Ok(RequestStats {
            total_requests: row.total_requests,
            pending_requests: row.pending_requests,
            reviewing_requests: row.reviewing_requests,
            approved_requests: row.approved_requests,
            rejected_requests: row.rejected_requests,
        })
    }
}
