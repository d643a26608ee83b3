use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use wayfare_core::pagination::Pagination;

/// Uniform envelope returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        message: None,
        data: Some(data),
        errors: None,
        pagination: None,
    })
}

pub fn ok_message<T: Serialize>(data: T, message: &str) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        message: Some(message.to_string()),
        data: Some(data),
        errors: None,
        pagination: None,
    })
}

/// Message-only success, for deletes and logout.
pub fn ok_empty(message: &str) -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse {
        success: true,
        message: Some(message.to_string()),
        data: None,
        errors: None,
        pagination: None,
    })
}

pub fn created<T: Serialize>(data: T, message: &str) -> (StatusCode, Json<ApiResponse<T>>) {
    (
        StatusCode::CREATED,
        Json(ApiResponse {
            success: true,
            message: Some(message.to_string()),
            data: Some(data),
            errors: None,
            pagination: None,
        }),
    )
}

pub fn paginated<T: Serialize>(items: Vec<T>, pagination: Pagination) -> Json<ApiResponse<Vec<T>>> {
    Json(ApiResponse {
        success: true,
        message: None,
        data: Some(items),
        errors: None,
        pagination: Some(pagination),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfare_core::pagination::PageRequest;

    #[test]
    fn envelope_omits_empty_fields() {
        let body = serde_json::to_value(&ok(serde_json::json!({"k": 1})).0).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["k"], 1);
        assert!(body.get("message").is_none());
        assert!(body.get("errors").is_none());
        assert!(body.get("pagination").is_none());
    }

    #[test]
    fn paginated_envelope_carries_pagination_block() {
        let page = Pagination::new(PageRequest::new(Some(2), Some(10)), 35);
        let body = serde_json::to_value(&paginated(vec![1, 2, 3], page).0).unwrap();
        assert_eq!(body["pagination"]["page"], 2);
        assert_eq!(body["pagination"]["total"], 35);
        assert_eq!(body["pagination"]["totalPages"], 4);
    }
}
