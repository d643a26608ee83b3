use axum::{http::Method, routing::get, Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod admins;
pub mod agents;
pub mod auth;
pub mod bookings;
pub mod error;
pub mod locations;
pub mod middleware;
pub mod packages;
pub mod requests;
pub mod response;
pub mod state;
pub mod travelers;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    let api = Router::new()
        .nest("/auth", auth::routes(state.clone()))
        .nest("/admins", admins::routes(state.clone()))
        .nest("/travelers", travelers::routes(state.clone()))
        .nest("/agents", agents::routes(state.clone()))
        .nest("/locations", locations::routes())
        .nest("/packages", packages::routes())
        .nest("/bookings", bookings::routes(state.clone()))
        .nest("/package-requests", requests::routes(state.clone()));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok",
    }))
}
