use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use wayfare_core::pagination::{PageRequest, Pagination};
use wayfare_core::traveler::{Traveler, TravelerFilter, TravelerUpdate};

use crate::error::AppError;
use crate::middleware::auth::{auth_middleware, require_admin, Claims};
use crate::response::{self, ApiResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_travelers))
        .route(
            "/{id}",
            get(get_traveler).put(update_traveler).delete(delete_traveler),
        )
        .route("/{id}/activate", post(activate_traveler))
        .layer(axum::middleware::from_fn_with_state(state, auth_middleware))
}

async fn list_travelers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Traveler>>>, AppError> {
    require_admin(&claims)?;

    let filter = TravelerFilter {
        is_active: query.is_active,
        search: query.search,
    };
    let page = PageRequest::new(query.page, query.limit);
    let (travelers, total) = state.travelers.list(&filter, page).await?;
    Ok(response::paginated(travelers, Pagination::new(page, total)))
}

async fn get_traveler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Traveler>>, AppError> {
    if !claims.can_access_traveler(id) {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }

    let traveler = state
        .travelers
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Traveler not found".to_string()))?;
    Ok(response::ok(traveler))
}

async fn update_traveler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(mut update): Json<TravelerUpdate>,
) -> Result<Json<ApiResponse<Traveler>>, AppError> {
    if !claims.can_access_traveler(id) {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }
    // Only admins may flip activation through this endpoint.
    if !claims.is_admin() {
        update.is_active = None;
    }

    let traveler = state
        .travelers
        .update(id, &update)
        .await?
        .ok_or_else(|| AppError::NotFound("Traveler not found".to_string()))?;
    Ok(response::ok_message(traveler, "Traveler updated successfully"))
}

async fn activate_traveler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Traveler>>, AppError> {
    require_admin(&claims)?;

    if !state.travelers.activate(id).await? {
        return Err(AppError::NotFound("Traveler not found".to_string()));
    }

    let traveler = state
        .travelers
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Traveler not found".to_string()))?;
    Ok(response::ok_message(
        traveler,
        "Traveler activated successfully",
    ))
}

async fn delete_traveler(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    require_admin(&claims)?;

    if !state.travelers.delete(id).await? {
        return Err(AppError::NotFound("Traveler not found".to_string()));
    }
    Ok(response::ok_empty("Traveler deleted successfully"))
}
