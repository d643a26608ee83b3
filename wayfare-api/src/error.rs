use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use wayfare_booking::WorkflowError;
use wayfare_core::StoreError;

#[derive(Debug)]
pub enum AppError {
    Unauthorized(String),
    Forbidden(String),
    Validation(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            // Conflicts (already confirmed, terminal cancel, duplicate
            // email) surface as 400 with a descriptive message.
            AppError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::PackageNotFound | WorkflowError::BookingNotFound
            | WorkflowError::TravelerNotFound => AppError::NotFound(err.to_string()),
            WorkflowError::PackageNotBookable => AppError::Validation(err.to_string()),
            WorkflowError::AlreadyConfirmed | WorkflowError::CancellationNotAllowed(_) => {
                AppError::Conflict(err.to_string())
            }
            WorkflowError::Validation(msg) => AppError::Validation(msg),
            WorkflowError::Credential(msg) => AppError::Internal(msg),
            WorkflowError::Store(inner) => AppError::Internal(inner.to_string()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}
