use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use wayfare_core::location::{
    Location, LocationFilter, LocationImage, LocationType, LocationUpdate, LocationWithImages,
    NewLocation, NewLocationImage,
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
    pub is_active: Option<bool>,
    pub location_type: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateLocationRequest {
    pub name: String,
    pub description: Option<String>,
    pub location_type: LocationType,
    pub location_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderImagesRequest {
    pub image_ids: Vec<Uuid>,
}

/// Browsing is public; mutations check the bearer token in the handler
/// since this group mixes both access levels on the same paths.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_locations).post(create_location))
        .route(
            "/{id}",
            get(get_location).put(update_location).delete(delete_location),
        )
        .route("/{id}/images", post(add_image))
        .route("/{id}/images/reorder", put(reorder_images))
        .route("/{id}/images/{image_id}", delete(delete_image))
}

async fn list_locations(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Location>>>, AppError> {
    let filter = LocationFilter {
        is_active: query.is_active,
        location_type: query
            .location_type
            .as_deref()
            .map(|v| {
                LocationType::parse(v)
                    .ok_or_else(|| AppError::Validation(format!("Unknown location type: {v}")))
            })
            .transpose()?,
        search: query.search,
    };
    let page = PageRequest::new(query.page, query.limit);
    let (locations, total) = state.locations.list(&filter, page).await?;
    Ok(response::paginated(locations, Pagination::new(page, total)))
}

async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<LocationWithImages>>, AppError> {
    let location = state
        .locations
        .find_with_images(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Location not found".to_string()))?;
    Ok(response::ok(location))
}

async fn create_location(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateLocationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Location>>), AppError> {
    require_admin(&claims_from_headers(&state, &headers)?)?;

    if req.name.trim().is_empty() {
        return Err(AppError::Validation("Location name is required".to_string()));
    }

    let location = state
        .locations
        .create(&NewLocation {
            name: req.name,
            description: req.description,
            location_type: req.location_type,
            location_url: req.location_url,
        })
        .await?;

    Ok(response::created(location, "Location created successfully"))
}

async fn update_location(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(update): Json<LocationUpdate>,
) -> Result<Json<ApiResponse<Location>>, AppError> {
    require_admin(&claims_from_headers(&state, &headers)?)?;

    let location = state
        .locations
        .update(id, &update)
        .await?
        .ok_or_else(|| AppError::NotFound("Location not found".to_string()))?;
    Ok(response::ok_message(location, "Location updated successfully"))
}

async fn delete_location(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    require_admin(&claims_from_headers(&state, &headers)?)?;

    if !state.locations.delete(id).await? {
        return Err(AppError::NotFound("Location not found".to_string()));
    }
    Ok(response::ok_empty("Location deleted successfully"))
}

/// POST /api/locations/{id}/images — register an already-hosted image
/// URL against the location gallery.
async fn add_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<NewLocationImage>,
) -> Result<(StatusCode, Json<ApiResponse<LocationImage>>), AppError> {
    require_admin(&claims_from_headers(&state, &headers)?)?;

    if state.locations.find_by_id(id).await?.is_none() {
        return Err(AppError::NotFound("Location not found".to_string()));
    }
    if req.image_url.trim().is_empty() {
        return Err(AppError::Validation("Image URL is required".to_string()));
    }

    let image = state.locations.add_image(id, &req).await?;
    Ok(response::created(image, "Image added successfully"))
}

async fn reorder_images(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<ReorderImagesRequest>,
) -> Result<Json<ApiResponse<LocationWithImages>>, AppError> {
    require_admin(&claims_from_headers(&state, &headers)?)?;

    state.locations.reorder_images(id, &req.image_ids).await?;

    let location = state
        .locations
        .find_with_images(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Location not found".to_string()))?;
    Ok(response::ok_message(location, "Images reordered successfully"))
}

async fn delete_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    require_admin(&claims_from_headers(&state, &headers)?)?;

    if !state.locations.delete_image(id, image_id).await? {
        return Err(AppError::NotFound("Image not found".to_string()));
    }
    Ok(response::ok_empty("Image deleted successfully"))
}
