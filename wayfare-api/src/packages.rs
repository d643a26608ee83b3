use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use wayfare_core::package::{
    ItineraryItem, NewPackage, Package, PackageFilter, PackageStatus, PackageUpdate,
    PackageWithItinerary,
};
use wayfare_core::pagination::{PageRequest, Pagination};

use crate::error::AppError;
use crate::middleware::auth::{claims_from_headers, require_admin};
use crate::response::{self, ApiResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<String>,
    pub is_template: Option<bool>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePackageRequest {
    pub title: String,
    pub description: Option<String>,
    pub no_of_days: i32,
    pub is_template: Option<bool>,
    pub base_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItineraryRequest {
    pub itinerary: Vec<ItineraryItem>,
}

#[derive(Debug, Deserialize)]
pub struct DuplicatePackageRequest {
    pub title: Option<String>,
}

/// Catalog browsing is public; authoring endpoints check the bearer
/// token in the handler.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_packages).post(create_package))
        .route(
            "/{id}",
            get(get_package).put(update_package).delete(delete_package),
        )
        .route("/{id}/itinerary", put(update_itinerary))
        .route("/{id}/publish", post(publish_package))
        .route("/{id}/unpublish", post(unpublish_package))
        .route("/{id}/duplicate", post(duplicate_package))
}

async fn list_packages(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Package>>>, AppError> {
    let filter = PackageFilter {
        status: query
            .status
            .as_deref()
            .map(|v| {
                PackageStatus::parse(v)
                    .ok_or_else(|| AppError::Validation(format!("Unknown package status: {v}")))
            })
            .transpose()?,
        is_template: query.is_template,
        is_active: query.is_active,
        search: query.search,
    };
    let page = PageRequest::new(query.page, query.limit);
    let (packages, total) = state.packages.list(&filter, page).await?;
    Ok(response::paginated(packages, Pagination::new(page, total)))
}

async fn get_package(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PackageWithItinerary>>, AppError> {
    let package = state
        .packages
        .find_with_itinerary(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Package not found".to_string()))?;
    Ok(response::ok(package))
}

async fn create_package(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreatePackageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Package>>), AppError> {
    let claims = claims_from_headers(&state, &headers)?;
    require_admin(&claims)?;

    if req.title.trim().is_empty() {
        return Err(AppError::Validation("Package title is required".to_string()));
    }
    if req.no_of_days < 1 {
        return Err(AppError::Validation(
            "Number of days must be at least 1".to_string(),
        ));
    }
    if req.base_price.is_some_and(|p| p < 0.0) {
        return Err(AppError::Validation(
            "Base price cannot be negative".to_string(),
        ));
    }

    let package = state
        .packages
        .create(&NewPackage {
            title: req.title,
            description: req.description,
            no_of_days: req.no_of_days,
            is_template: req.is_template.unwrap_or(false),
            base_price: req.base_price,
            created_by: claims.sub,
        })
        .await?;

    Ok(response::created(package, "Package created successfully"))
}

async fn update_package(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(update): Json<PackageUpdate>,
) -> Result<Json<ApiResponse<PackageWithItinerary>>, AppError> {
    require_admin(&claims_from_headers(&state, &headers)?)?;

    if state.packages.update(id, &update).await?.is_none() {
        return Err(AppError::NotFound("Package not found".to_string()));
    }

    let package = state
        .packages
        .find_with_itinerary(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Package not found".to_string()))?;
    Ok(response::ok_message(package, "Package updated successfully"))
}

async fn delete_package(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    require_admin(&claims_from_headers(&state, &headers)?)?;

    if !state.packages.delete(id).await? {
        return Err(AppError::NotFound("Package not found".to_string()));
    }
    Ok(response::ok_empty("Package deleted successfully"))
}

/// PUT /api/packages/{id}/itinerary — transactional replace of every
/// stop; day grouping happens on read.
async fn update_itinerary(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateItineraryRequest>,
) -> Result<Json<ApiResponse<PackageWithItinerary>>, AppError> {
    require_admin(&claims_from_headers(&state, &headers)?)?;

    if state.packages.find_by_id(id).await?.is_none() {
        return Err(AppError::NotFound("Package not found".to_string()));
    }
    if req.itinerary.iter().any(|item| item.day_number < 1) {
        return Err(AppError::Validation(
            "Itinerary day numbers must start at 1".to_string(),
        ));
    }

    state.packages.replace_itinerary(id, &req.itinerary).await?;

    let package = state
        .packages
        .find_with_itinerary(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Package not found".to_string()))?;
    Ok(response::ok_message(package, "Itinerary updated successfully"))
}

async fn publish_package(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Package>>, AppError> {
    require_admin(&claims_from_headers(&state, &headers)?)?;

    if !state.packages.publish(id).await? {
        return Err(AppError::NotFound("Package not found".to_string()));
    }
    let package = state
        .packages
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Package not found".to_string()))?;
    Ok(response::ok_message(package, "Package published successfully"))
}

async fn unpublish_package(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Package>>, AppError> {
    require_admin(&claims_from_headers(&state, &headers)?)?;

    if !state.packages.unpublish(id).await? {
        return Err(AppError::NotFound("Package not found".to_string()));
    }
    let package = state
        .packages
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Package not found".to_string()))?;
    Ok(response::ok_message(
        package,
        "Package unpublished successfully",
    ))
}

async fn duplicate_package(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<DuplicatePackageRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PackageWithItinerary>>), AppError> {
    let claims = claims_from_headers(&state, &headers)?;
    require_admin(&claims)?;

    let new_id = state
        .packages
        .duplicate(id, req.title.as_deref(), claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("Package not found".to_string()))?;

    let package = state
        .packages
        .find_with_itinerary(new_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Package not found".to_string()))?;
    Ok(response::created(package, "Package duplicated successfully"))
}
