use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use wayfare_booking::BookingSubmission;
use wayfare_core::booking::{BookingFilter, BookingStatus, BookingSummary, BookingUpdate};
use wayfare_core::pagination::{PageRequest, Pagination};

use crate::error::AppError;
use crate::middleware::auth::{auth_middleware, require_admin, Claims};
use crate::response::{self, ApiResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListBookingsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/", get(list_bookings))
        .route("/stats", get(booking_stats))
        .route("/traveler/{traveler_id}", get(traveler_bookings))
        .route("/{id}", get(get_booking).put(update_booking))
        .route("/{id}/confirm", post(confirm_booking))
        .route("/{id}/cancel", post(cancel_booking))
        .route("/{id}/status", patch(update_booking_status))
        .layer(axum::middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/submit", post(submit_booking))
        .merge(protected)
}

/// POST /api/bookings/submit — public entry point of the booking
/// workflow. 201 with the joined booking and the new-account flag.
async fn submit_booking(
    State(state): State<AppState>,
    Json(submission): Json<BookingSubmission>,
) -> Result<(StatusCode, Json<ApiResponse<serde_json::Value>>), AppError> {
    let outcome = state.workflow.submit(submission).await?;

    Ok(response::created(
        json!({
            "booking": outcome.booking,
            "is_new_account": outcome.is_new_account,
        }),
        "Booking submitted successfully",
    ))
}

async fn list_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<ApiResponse<Vec<BookingSummary>>>, AppError> {
    require_admin(&claims)?;

    let filter = BookingFilter {
        status: parse_status_filter(query.status.as_deref())?,
        payment_status: query
            .payment_status
            .as_deref()
            .map(|v| {
                wayfare_core::booking::PaymentStatus::parse(v)
                    .ok_or_else(|| AppError::Validation(format!("Unknown payment status: {v}")))
            })
            .transpose()?,
        search: query.search.clone(),
        ..Default::default()
    };
    let page = PageRequest::new(query.page, query.limit);

    let (bookings, total) = state.bookings.list(&filter, page).await?;
    Ok(response::paginated(bookings, Pagination::new(page, total)))
}

async fn booking_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<wayfare_core::booking::BookingStats>>, AppError> {
    require_admin(&claims)?;
    let stats = state.bookings.stats().await?;
    Ok(response::ok(stats))
}

async fn get_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<wayfare_core::booking::BookingWithRelations>>, AppError> {
    let booking = state
        .bookings
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    if !claims.can_access_traveler(booking.traveler_id) {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }

    Ok(response::ok(booking))
}

async fn traveler_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(traveler_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<BookingSummary>>>, AppError> {
    if !claims.can_access_traveler(traveler_id) {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }

    let bookings = state.bookings.list_for_traveler(traveler_id).await?;
    Ok(response::ok(bookings))
}

async fn update_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(update): Json<BookingUpdate>,
) -> Result<Json<ApiResponse<wayfare_core::booking::BookingWithRelations>>, AppError> {
    require_admin(&claims)?;

    if state.bookings.find_by_id(id).await?.is_none() {
        return Err(AppError::NotFound("Booking not found".to_string()));
    }

    state.bookings.update(id, &update).await?;

    let updated = state
        .bookings
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    Ok(response::ok_message(updated, "Booking updated successfully"))
}

/// POST /api/bookings/{id}/confirm — the only path to `confirmed`, so
/// activation and notification always ride along.
async fn confirm_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<wayfare_core::booking::BookingWithRelations>>, AppError> {
    require_admin(&claims)?;

    let confirmed = state.workflow.confirm(id, claims.sub).await?;
    Ok(response::ok_message(
        confirmed,
        "Booking confirmed successfully",
    ))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<wayfare_core::booking::BookingWithRelations>>, AppError> {
    let booking = state
        .bookings
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    if !claims.can_access_traveler(booking.traveler_id) {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }

    let cancelled = state.workflow.cancel(id).await?;
    Ok(response::ok_message(
        cancelled,
        "Booking cancelled successfully",
    ))
}

async fn update_booking_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<wayfare_core::booking::BookingWithRelations>>, AppError> {
    require_admin(&claims)?;

    let updated = state.workflow.update_status(id, req.status).await?;
    Ok(response::ok_message(
        updated,
        "Booking status updated successfully",
    ))
}

fn parse_status_filter(value: Option<&str>) -> Result<Option<BookingStatus>, AppError> {
    value
        .map(|v| {
            BookingStatus::parse(v)
                .ok_or_else(|| AppError::Validation(format!("Unknown booking status: {v}")))
        })
        .transpose()
}
