use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use wayfare_core::admin::{Admin, AdminUpdate, NewAdmin};
use wayfare_core::credentials;
use wayfare_core::pagination::{PageRequest, Pagination};

use crate::error::AppError;
use crate::middleware::auth::admin_auth_middleware;
use crate::response::{self, ApiResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_admins).post(create_admin))
        .route(
            "/{id}",
            get(get_admin).put(update_admin).delete(delete_admin),
        )
        .layer(axum::middleware::from_fn_with_state(
            state,
            admin_auth_middleware,
        ))
}

async fn list_admins(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Admin>>>, AppError> {
    let page = PageRequest::new(query.page, query.limit);
    let (admins, total) = state.admins.list(page).await?;
    Ok(response::paginated(admins, Pagination::new(page, total)))
}

async fn get_admin(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Admin>>, AppError> {
    let admin = state
        .admins
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))?;
    Ok(response::ok(admin))
}

async fn create_admin(
    State(state): State<AppState>,
    Json(req): Json<CreateAdminRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Admin>>), AppError> {
    if req.name.trim().is_empty() || req.email.trim().is_empty() {
        return Err(AppError::Validation("Name and email are required".to_string()));
    }
    if req.password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    if state
        .admins
        .find_account_by_email(&req.email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Email already in use".to_string()));
    }

    let password_hash = credentials::hash_password(&req.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let admin = state
        .admins
        .create(&NewAdmin {
            email: req.email,
            password_hash,
            name: req.name,
        })
        .await?;

    Ok(response::created(admin, "Admin created successfully"))
}

async fn update_admin(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<AdminUpdate>,
) -> Result<Json<ApiResponse<Admin>>, AppError> {
    let admin = state
        .admins
        .update(id, &update)
        .await?
        .ok_or_else(|| AppError::NotFound("Admin not found".to_string()))?;
    Ok(response::ok_message(admin, "Admin updated successfully"))
}

async fn delete_admin(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    if !state.admins.delete(id).await? {
        return Err(AppError::NotFound("Admin not found".to_string()));
    }
    Ok(response::ok_empty("Admin deleted successfully"))
}
