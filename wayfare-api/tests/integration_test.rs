use axum::http::StatusCode;
use axum::response::IntoResponse;
use uuid::Uuid;

use wayfare_api::error::AppError;
use wayfare_api::middleware::auth::{decode_token, issue_token, Claims, ROLE_ADMIN, ROLE_TRAVELER};
use wayfare_booking::WorkflowError;
use wayfare_core::booking::BookingStatus;

const SECRET: &str = "test-secret";

#[test]
fn token_round_trips_claims() {
    let sub = Uuid::new_v4();
    let token = issue_token(sub, "admin@example.com", "Admin", ROLE_ADMIN, SECRET, 3600).unwrap();

    let claims = decode_token(&token, SECRET).unwrap();
    assert_eq!(claims.sub, sub);
    assert_eq!(claims.email, "admin@example.com");
    assert!(claims.is_admin());
}

#[test]
fn token_rejects_wrong_secret() {
    let token = issue_token(
        Uuid::new_v4(),
        "a@x.com",
        "A",
        ROLE_TRAVELER,
        SECRET,
        3600,
    )
    .unwrap();
    assert!(decode_token(&token, "other-secret").is_err());
}

#[test]
fn traveler_claims_scope_to_own_records() {
    let own_id = Uuid::new_v4();
    let claims = Claims {
        sub: own_id,
        email: "t@x.com".into(),
        name: "T".into(),
        role: ROLE_TRAVELER.into(),
        exp: usize::MAX,
    };
    assert!(claims.can_access_traveler(own_id));
    assert!(!claims.can_access_traveler(Uuid::new_v4()));

    let admin = Claims {
        sub: Uuid::new_v4(),
        email: "a@x.com".into(),
        name: "A".into(),
        role: ROLE_ADMIN.into(),
        exp: usize::MAX,
    };
    assert!(admin.can_access_traveler(own_id));
}

#[test]
fn workflow_errors_map_to_contract_status_codes() {
    let cases = [
        (WorkflowError::PackageNotFound, StatusCode::NOT_FOUND),
        (WorkflowError::BookingNotFound, StatusCode::NOT_FOUND),
        (WorkflowError::PackageNotBookable, StatusCode::BAD_REQUEST),
        (WorkflowError::AlreadyConfirmed, StatusCode::BAD_REQUEST),
        (
            WorkflowError::CancellationNotAllowed(BookingStatus::Completed),
            StatusCode::BAD_REQUEST,
        ),
        (
            WorkflowError::Validation("bad input".into()),
            StatusCode::BAD_REQUEST,
        ),
    ];

    for (err, expected) in cases {
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), expected);
    }
}

#[test]
fn internal_errors_hide_detail() {
    let response = AppError::Internal("connection refused to 10.0.0.5".into()).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn auth_errors_use_401_and_403() {
    assert_eq!(
        AppError::Unauthorized("No token provided".into())
            .into_response()
            .status(),
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        AppError::Forbidden("Access denied".into())
            .into_response()
            .status(),
        StatusCode::FORBIDDEN
    );
}
