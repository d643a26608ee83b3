use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use wayfare_core::pagination::{PageRequest, Pagination};
use wayfare_core::request::{
    NewPackageRequest, PackageRequest, RequestFilter, RequestStats, RequestStatus,
};

use crate::error::AppError;
use crate::middleware::auth::{auth_middleware, require_admin, Claims};
use crate::response::{self, ApiResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    pub title: String,
    pub description: String,
    pub no_of_days: i32,
    pub no_of_travelers: Option<i32>,
    pub preferred_start_date: Option<NaiveDate>,
    pub budget_range: Option<String>,
    pub special_requirements: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusBody {
    pub status: RequestStatus,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApproveBody {
    pub package_id: Option<Uuid>,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RejectBody {
    pub admin_notes: Option<String>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_requests).post(create_request))
        .route("/stats", get(request_stats))
        .route("/traveler/{traveler_id}", get(traveler_requests))
        .route("/{id}", get(get_request))
        .route("/{id}/status", patch(update_request_status))
        .route("/{id}/approve", post(approve_request))
        .route("/{id}/reject", post(reject_request))
        .layer(axum::middleware::from_fn_with_state(state, auth_middleware))
}

async fn list_requests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<PackageRequest>>>, AppError> {
    require_admin(&claims)?;

    let filter = RequestFilter {
        status: query
            .status
            .as_deref()
            .map(|v| {
                RequestStatus::parse(v)
                    .ok_or_else(|| AppError::Validation(format!("Unknown request status: {v}")))
            })
            .transpose()?,
        search: query.search.clone(),
        ..Default::default()
    };
    let page = PageRequest::new(query.page, query.limit);
    let (requests, total) = state.requests.list(&filter, page).await?;
    Ok(response::paginated(requests, Pagination::new(page, total)))
}

async fn request_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<RequestStats>>, AppError> {
    require_admin(&claims)?;
    Ok(response::ok(state.requests.stats().await?))
}

async fn get_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PackageRequest>>, AppError> {
    let request = state
        .requests
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Package request not found".to_string()))?;

    if !claims.can_access_traveler(request.traveler_id) {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }

    Ok(response::ok(request))
}

async fn traveler_requests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(traveler_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<PackageRequest>>>, AppError> {
    if !claims.can_access_traveler(traveler_id) {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }

    let requests = state.requests.list_for_traveler(traveler_id).await?;
    Ok(response::ok(requests))
}

/// POST /api/package-requests — travelers submit custom trip briefs.
/// The acknowledgment email is best-effort and never fails the create.
async fn create_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CreateRequestBody>,
) -> Result<(StatusCode, Json<ApiResponse<PackageRequest>>), AppError> {
    if claims.is_admin() {
        return Err(AppError::Forbidden(
            "Access denied. Traveler role required.".to_string(),
        ));
    }
    if body.title.trim().is_empty() || body.description.trim().is_empty() {
        return Err(AppError::Validation(
            "Title and description are required".to_string(),
        ));
    }
    if body.no_of_days < 1 {
        return Err(AppError::Validation(
            "Number of days must be at least 1".to_string(),
        ));
    }
    if body.no_of_travelers.is_some_and(|n| n < 1) {
        return Err(AppError::Validation(
            "Number of travelers must be at least 1".to_string(),
        ));
    }

    let request_id = state
        .requests
        .create(&NewPackageRequest {
            traveler_id: claims.sub,
            title: body.title,
            description: body.description,
            no_of_days: body.no_of_days,
            no_of_travelers: body.no_of_travelers.unwrap_or(1),
            preferred_start_date: body.preferred_start_date,
            budget_range: body.budget_range,
            special_requirements: body.special_requirements,
        })
        .await?;

    let request = state
        .requests
        .find_by_id(request_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Package request not found".to_string()))?;

    if let Err(err) = state
        .mailer
        .send_request_acknowledgment(&request.traveler_email, &request)
        .await
    {
        warn!(request_id = %request_id, error = %err, "request acknowledgment email failed");
    }

    Ok(response::created(
        request,
        "Package request submitted successfully",
    ))
}

async fn update_request_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStatusBody>,
) -> Result<Json<ApiResponse<PackageRequest>>, AppError> {
    require_admin(&claims)?;

    if !state
        .requests
        .set_status(id, body.status, body.admin_notes.as_deref())
        .await?
    {
        return Err(AppError::NotFound("Package request not found".to_string()));
    }

    let request = state
        .requests
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Package request not found".to_string()))?;
    Ok(response::ok_message(
        request,
        "Package request status updated successfully",
    ))
}

async fn approve_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(body): Json<ApproveBody>,
) -> Result<Json<ApiResponse<PackageRequest>>, AppError> {
    require_admin(&claims)?;

    let request = state
        .requests
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Package request not found".to_string()))?;

    if request.status == RequestStatus::Approved {
        return Err(AppError::Conflict(
            "Package request is already approved".to_string(),
        ));
    }
    if let Some(package_id) = body.package_id {
        if state.packages.find_by_id(package_id).await?.is_none() {
            return Err(AppError::NotFound("Package not found".to_string()));
        }
    }

    state
        .requests
        .approve(id, claims.sub, body.package_id, body.admin_notes.as_deref())
        .await?;

    let approved = state
        .requests
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Package request not found".to_string()))?;
    Ok(response::ok_message(
        approved,
        "Package request approved successfully",
    ))
}

async fn reject_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(body): Json<RejectBody>,
) -> Result<Json<ApiResponse<PackageRequest>>, AppError> {
    require_admin(&claims)?;

    let request = state
        .requests
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Package request not found".to_string()))?;

    if request.status == RequestStatus::Rejected {
        return Err(AppError::Conflict(
            "Package request is already rejected".to_string(),
        ));
    }

    state
        .requests
        .reject(id, claims.sub, body.admin_notes.as_deref())
        .await?;

    let rejected = state
        .requests
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Package request not found".to_string()))?;
    Ok(response::ok_message(rejected, "Package request rejected"))
}
