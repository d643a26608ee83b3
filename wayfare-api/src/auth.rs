use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use wayfare_core::credentials;

use crate::error::AppError;
use crate::middleware::auth::{
    auth_middleware, issue_token, Claims, ROLE_ADMIN, ROLE_TRAVELER,
};
use crate::response::{self, ApiResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    #[serde(rename = "currentPassword")]
    pub current_password: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(me))
        .route("/change-password", post(change_password))
        .route("/logout", post(logout))
        .layer(axum::middleware::from_fn_with_state(state, auth_middleware));

    Router::new().route("/login", post(login)).merge(protected)
}

/// Single login endpoint for both roles: the admin table is consulted
/// first, then travelers, matching how the account spaces overlap.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    if let Some(admin) = state.admins.find_account_by_email(&req.email).await? {
        if !admin.is_active {
            return Err(AppError::Forbidden(
                "Account is not active. Please contact administrator.".to_string(),
            ));
        }
        if !verify(&req.password, &admin.password_hash)? {
            return Err(invalid_credentials());
        }
        state.admins.touch_last_login(admin.admin_id).await?;
        let token = issue_token(
            admin.admin_id,
            &admin.email,
            &admin.name,
            ROLE_ADMIN,
            &state.auth.secret,
            state.auth.expiration,
        )
        .map_err(|e| AppError::Internal(format!("Token encoding failed: {e}")))?;

        return Ok(response::ok_message(
            json!({
                "token": token,
                "user": {
                    "admin_id": admin.admin_id,
                    "email": admin.email,
                    "name": admin.name,
                    "role": ROLE_ADMIN,
                },
            }),
            "Login successful",
        ));
    }

    let Some(traveler) = state.travelers.find_account_by_email(&req.email).await? else {
        return Err(invalid_credentials());
    };

    if !traveler.is_active {
        return Err(AppError::Forbidden(
            "Account is not active. Please contact administrator.".to_string(),
        ));
    }
    if !verify(&req.password, &traveler.password_hash)? {
        return Err(invalid_credentials());
    }
    state.travelers.touch_last_login(traveler.traveler_id).await?;

    let token = issue_token(
        traveler.traveler_id,
        &traveler.email,
        &traveler.name,
        ROLE_TRAVELER,
        &state.auth.secret,
        state.auth.expiration,
    )
    .map_err(|e| AppError::Internal(format!("Token encoding failed: {e}")))?;

    Ok(response::ok_message(
        json!({
            "token": token,
            "user": {
                "traveler_id": traveler.traveler_id,
                "email": traveler.email,
                "name": traveler.name,
                "contact": traveler.contact,
                "role": ROLE_TRAVELER,
            },
        }),
        "Login successful",
    ))
}

async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    if claims.is_admin() {
        let admin = state
            .admins
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let mut user = serde_json::to_value(admin).map_err(|e| AppError::Internal(e.to_string()))?;
        user["role"] = json!(ROLE_ADMIN);
        return Ok(response::ok(user));
    }

    let traveler = state
        .travelers
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    let mut user = serde_json::to_value(traveler).map_err(|e| AppError::Internal(e.to_string()))?;
    user["role"] = json!(ROLE_TRAVELER);
    Ok(response::ok(user))
}

async fn change_password(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    if req.new_password.len() < 8 {
        return Err(AppError::Validation(
            "New password must be at least 8 characters".to_string(),
        ));
    }

    let current_hash = if claims.is_admin() {
        state
            .admins
            .find_account_by_email(&claims.email)
            .await?
            .map(|a| a.password_hash)
    } else {
        state
            .travelers
            .find_account_by_email(&claims.email)
            .await?
            .map(|t| t.password_hash)
    }
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if !verify(&req.current_password, &current_hash)? {
        return Err(AppError::Validation(
            "Current password is incorrect".to_string(),
        ));
    }

    let new_hash = credentials::hash_password(&req.new_password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if claims.is_admin() {
        state.admins.set_password_hash(claims.sub, &new_hash).await?;
    } else {
        state
            .travelers
            .set_password_hash(claims.sub, &new_hash)
            .await?;
    }

    if let Err(err) = state
        .mailer
        .send_password_change_notice(&claims.email, &claims.name)
        .await
    {
        warn!(error = %err, "password change notice failed");
    }

    Ok(response::ok_empty("Password changed successfully"))
}

async fn logout() -> Json<ApiResponse<serde_json::Value>> {
    // Stateless tokens; the client discards its copy.
    response::ok_empty("Logged out successfully")
}

fn verify(plain: &str, hash: &str) -> Result<bool, AppError> {
    credentials::verify_password(plain, hash).map_err(|e| AppError::Internal(e.to_string()))
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid email or password".to_string())
}
