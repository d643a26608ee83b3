use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_TRAVELER: &str = "traveler";

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub exp: usize,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    /// Admins see everything; travelers only their own records.
    pub fn can_access_traveler(&self, traveler_id: Uuid) -> bool {
        self.is_admin() || self.sub == traveler_id
    }
}

pub fn issue_token(
    sub: Uuid,
    email: &str,
    name: &str,
    role: &str,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub,
        email: email.to_string(),
        name: name.to_string(),
        role: role.to_string(),
        exp: (Utc::now() + Duration::seconds(expiration_seconds as i64)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

// ============================================================================
// Authentication Middleware
// ============================================================================

/// Verify the bearer token and inject claims into request extensions.
/// Role checks happen per handler; this only establishes identity.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = claims_from_headers(&state, req.headers())?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Verify the bearer token and require the admin role.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = claims_from_headers(&state, req.headers())?;
    require_admin(&claims)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Header-level authentication for route groups that mix public and
/// protected endpoints and therefore carry no middleware layer.
pub fn claims_from_headers(state: &AppState, headers: &HeaderMap) -> Result<Claims, AppError> {
    let auth_header = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("No token provided".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("No token provided".to_string()))?;

    decode_token(token, &state.auth.secret)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))
}

pub fn require_admin(claims: &Claims) -> Result<(), AppError> {
    if !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Access denied. Admin role required.".to_string(),
        ));
    }
    Ok(())
}
