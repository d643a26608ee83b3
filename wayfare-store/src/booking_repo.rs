use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use wayfare_core::booking::{
    BookingFilter, BookingStats, BookingStatus, BookingSummary, BookingUpdate,
    BookingWithRelations, NewBooking, PaymentStatus,
};
use wayfare_core::pagination::PageRequest;
use wayfare_core::repository::BookingStore;
use wayfare_core::{StoreError, StoreResult};

use crate::backend;

pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    booking_id: Uuid,
    package_id: Uuid,
    traveler_id: Uuid,
    agent_id: Option<Uuid>,
    status: String,
    payment_status: String,
    no_of_travelers: i32,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    total_amount: Option<f64>,
    booking_date: DateTime<Utc>,
    confirmation_date: Option<DateTime<Utc>>,
    confirmed_by: Option<Uuid>,
    confirmed_by_name: Option<String>,
    admin_notes: Option<String>,
    traveler_notes: Option<String>,
    package_title: String,
    package_days: i32,
    traveler_name: String,
    traveler_email: String,
    traveler_contact: String,
    agent_name: Option<String>,
    agent_email: Option<String>,
}

fn parse_status(value: &str) -> StoreResult<BookingStatus> {
    BookingStatus::parse(value).ok_or_else(|| StoreError::Corrupt {
        column: "bookings.status",
        value: value.to_string(),
    })
}

fn parse_payment_status(value: &str) -> StoreResult<PaymentStatus> {
    PaymentStatus::parse(value).ok_or_else(|| StoreError::Corrupt {
        column: "bookings.payment_status",
        value: value.to_string(),
    })
}

impl TryFrom<BookingRow> for BookingWithRelations {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, StoreError> {
        Ok(BookingWithRelations {
            booking_id: row.booking_id,
            package_id: row.package_id,
            traveler_id: row.traveler_id,
            agent_id: row.agent_id,
            status: parse_status(&row.status)?,
            payment_status: parse_payment_status(&row.payment_status)?,
            no_of_travelers: row.no_of_travelers,
            start_date: row.start_date,
            end_date: row.end_date,
            total_amount: row.total_amount,
            booking_date: row.booking_date,
            confirmation_date: row.confirmation_date,
            confirmed_by: row.confirmed_by,
            confirmed_by_name: row.confirmed_by_name,
            admin_notes: row.admin_notes,
            traveler_notes: row.traveler_notes,
            package_title: row.package_title,
            package_days: row.package_days,
            traveler_name: row.traveler_name,
            traveler_email: row.traveler_email,
            traveler_contact: row.traveler_contact,
            agent_name: row.agent_name,
            agent_email: row.agent_email,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BookingSummaryRow {
    booking_id: Uuid,
    status: String,
    payment_status: String,
    no_of_travelers: i32,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    total_amount: Option<f64>,
    booking_date: DateTime<Utc>,
    confirmation_date: Option<DateTime<Utc>>,
    package_title: String,
    traveler_name: String,
    traveler_email: String,
    agent_name: Option<String>,
}

impl TryFrom<BookingSummaryRow> for BookingSummary {
    type Error = StoreError;

    fn try_from(row: BookingSummaryRow) -> Result<Self, StoreError> {
        Ok(BookingSummary {
            booking_id: row.booking_id,
            status: parse_status(&row.status)?,
            payment_status: parse_payment_status(&row.payment_status)?,
            no_of_travelers: row.no_of_travelers,
            start_date: row.start_date,
            end_date: row.end_date,
            total_amount: row.total_amount,
            booking_date: row.booking_date,
            confirmation_date: row.confirmation_date,
            package_title: row.package_title,
            traveler_name: row.traveler_name,
            traveler_email: row.traveler_email,
            agent_name: row.agent_name,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BookingStatsRow {
    total_bookings: i64,
    temporary_bookings: i64,
    confirmed_bookings: i64,
    completed_bookings: i64,
    cancelled_bookings: i64,
    total_revenue: Option<f64>,
    paid_revenue: Option<f64>,
}

const SUMMARY_SELECT: &str = "SELECT b.booking_id, b.status, b.payment_status, b.no_of_travelers, \
       b.start_date, b.end_date, b.total_amount, b.booking_date, b.confirmation_date, \
       p.title AS package_title, t.name AS traveler_name, t.email AS traveler_email, \
       a.name AS agent_name \
     FROM bookings b \
     INNER JOIN packages p ON b.package_id = p.package_id \
     INNER JOIN travelers t ON b.traveler_id = t.traveler_id \
     LEFT JOIN agents a ON b.agent_id = a.agent_id \
     WHERE 1=1";

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &BookingFilter) {
    if let Some(status) = filter.status {
        builder.push(" AND b.status = ");
        builder.push_bind(status.as_str());
    }
    if let Some(payment_status) = filter.payment_status {
        builder.push(" AND b.payment_status = ");
        builder.push_bind(payment_status.as_str());
    }
    if let Some(traveler_id) = filter.traveler_id {
        builder.push(" AND b.traveler_id = ");
        builder.push_bind(traveler_id);
    }
    if let Some(agent_id) = filter.agent_id {
        builder.push(" AND b.agent_id = ");
        builder.push_bind(agent_id);
    }
    if let Some(package_id) = filter.package_id {
        builder.push(" AND b.package_id = ");
        builder.push_bind(package_id);
    }
    if let Some(search) = &filter.search {
        let term = format!("%{}%", search);
        builder.push(" AND (t.name ILIKE ");
        builder.push_bind(term.clone());
        builder.push(" OR t.email ILIKE ");
        builder.push_bind(term.clone());
        builder.push(" OR p.title ILIKE ");
        builder.push_bind(term);
        builder.push(")");
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn find_by_id(&self, booking_id: Uuid) -> StoreResult<Option<BookingWithRelations>> {
        let row = sqlx::query_as::<_, BookingRow>(
            "SELECT b.booking_id, b.package_id, b.traveler_id, b.agent_id, b.status, \
                    b.payment_status, b.no_of_travelers, b.start_date, b.end_date, \
                    b.total_amount, b.booking_date, b.confirmation_date, b.confirmed_by, \
                    adm.name AS confirmed_by_name, b.admin_notes, b.traveler_notes, \
                    p.title AS package_title, p.no_of_days AS package_days, \
                    t.name AS traveler_name, t.email AS traveler_email, \
                    t.contact AS traveler_contact, \
                    a.name AS agent_name, a.email AS agent_email \
             FROM bookings b \
             INNER JOIN packages p ON b.package_id = p.package_id \
             INNER JOIN travelers t ON b.traveler_id = t.traveler_id \
             LEFT JOIN agents a ON b.agent_id = a.agent_id \
             LEFT JOIN admins adm ON b.confirmed_by = adm.admin_id \
             WHERE b.booking_id = $1",
        )
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        row.map(BookingWithRelations::try_from).transpose()
    }

    async fn list(
        &self,
        filter: &BookingFilter,
        page: PageRequest,
    ) -> StoreResult<(Vec<BookingSummary>, i64)> {
        let mut builder = QueryBuilder::<Postgres>::new(SUMMARY_SELECT);
        push_filters(&mut builder, filter);
        builder.push(" ORDER BY b.booking_date DESC LIMIT ");
        builder.push_bind(page.limit);
        builder.push(" OFFSET ");
        builder.push_bind(page.offset());

        let rows: Vec<BookingSummaryRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM bookings b \
             INNER JOIN packages p ON b.package_id = p.package_id \
             INNER JOIN travelers t ON b.traveler_id = t.traveler_id \
             LEFT JOIN agents a ON b.agent_id = a.agent_id \
             WHERE 1=1",
        );
        push_filters(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;

        let summaries = rows
            .into_iter()
            .map(BookingSummary::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((summaries, total))
    }

    async fn list_for_traveler(&self, traveler_id: Uuid) -> StoreResult<Vec<BookingSummary>> {
        let mut builder = QueryBuilder::<Postgres>::new(SUMMARY_SELECT);
        builder.push(" AND b.traveler_id = ");
        builder.push_bind(traveler_id);
        builder.push(" ORDER BY b.booking_date DESC");

        let rows: Vec<BookingSummaryRow> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(backend)?;

        rows.into_iter().map(BookingSummary::try_from).collect()
    }

    async fn create(&self, booking: &NewBooking) -> StoreResult<Uuid> {
        let booking_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO bookings (booking_id, package_id, traveler_id, agent_id, status, \
                no_of_travelers, start_date, end_date, total_amount, payment_status, traveler_notes) \
             VALUES ($1, $2, $3, $4, 'temporary', $5, $6, $7, $8, 'pending', $9)",
        )
        .bind(booking_id)
        .bind(booking.package_id)
        .bind(booking.traveler_id)
        .bind(booking.agent_id)
        .bind(booking.no_of_travelers)
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(booking.total_amount)
        .bind(&booking.traveler_notes)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(booking_id)
    }

    async fn update(&self, booking_id: Uuid, update: &BookingUpdate) -> StoreResult<bool> {
        if update.is_empty() {
            return Ok(true);
        }

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE bookings SET ");
        let mut sets = builder.separated(", ");
        if let Some(status) = update.status {
            sets.push("status = ");
            sets.push_bind_unseparated(status.as_str());
        }
        if let Some(payment_status) = update.payment_status {
            sets.push("payment_status = ");
            sets.push_bind_unseparated(payment_status.as_str());
        }
        if let Some(no_of_travelers) = update.no_of_travelers {
            sets.push("no_of_travelers = ");
            sets.push_bind_unseparated(no_of_travelers);
        }
        if let Some(start_date) = update.start_date {
            sets.push("start_date = ");
            sets.push_bind_unseparated(start_date);
        }
        if let Some(end_date) = update.end_date {
            sets.push("end_date = ");
            sets.push_bind_unseparated(end_date);
        }
        if let Some(total_amount) = update.total_amount {
            sets.push("total_amount = ");
            sets.push_bind_unseparated(total_amount);
        }
        if let Some(agent_id) = update.agent_id {
            sets.push("agent_id = ");
            sets.push_bind_unseparated(agent_id);
        }
        if let Some(admin_notes) = &update.admin_notes {
            sets.push("admin_notes = ");
            sets.push_bind_unseparated(admin_notes);
        }
        if let Some(traveler_notes) = &update.traveler_notes {
            sets.push("traveler_notes = ");
            sets.push_bind_unseparated(traveler_notes);
        }
        builder.push(" WHERE booking_id = ");
        builder.push_bind(booking_id);

        let result = builder.build().execute(&self.pool).await.map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn confirm(&self, booking_id: Uuid, admin_id: Uuid) -> StoreResult<bool> {
        // Conditional update: under concurrent confirms only one call
        // sees a row change, the loser observes zero rows affected.
        let result = sqlx::query(
            "UPDATE bookings \
             SET status = 'confirmed', confirmation_date = NOW(), confirmed_by = $1 \
             WHERE booking_id = $2 AND status <> 'confirmed'",
        )
        .bind(admin_id)
        .bind(booking_id)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_status(&self, booking_id: Uuid, status: BookingStatus) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE bookings SET status = $1 WHERE booking_id = $2")
            .bind(status.as_str())
            .bind(booking_id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn stats(&self) -> StoreResult<BookingStats> {
        let row = sqlx::query_as::<_, BookingStatsRow>(
            "SELECT \
               COUNT(*) AS total_bookings, \
               COUNT(*) FILTER (WHERE status = 'temporary') AS temporary_bookings, \
               COUNT(*) FILTER (WHERE status = 'confirmed') AS confirmed_bookings, \
               COUNT(*) FILTER (WHERE status = 'completed') AS completed_bookings, \
               COUNT(*) FILTER (WHERE status = 'cancelled') AS cancelled_bookings, \
               SUM(total_amount) AS total_revenue, \
               SUM(total_amount) FILTER (WHERE payment_status = 'paid') AS paid_revenue \
             FROM bookings",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(backend)?;

        Ok(BookingStats {
            total_bookings: row.total_bookings,
            temporary_bookings: row.temporary_bookings,
            confirmed_bookings: row.confirmed_bookings,
            completed_bookings: row.completed_bookings,
            cancelled_bookings: row.cancelled_bookings,
            total_revenue: row.total_revenue.unwrap_or(0.0),
            paid_revenue: row.paid_revenue.unwrap_or(0.0),
        })
    }
}
