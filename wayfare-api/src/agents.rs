use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use wayfare_core::agent::{Agent, AgentFilter, AgentUpdate, NewAgent};
use wayfare_core::pagination::{PageRequest, Pagination};

use crate::error::AppError;
use crate::middleware::auth::admin_auth_middleware;
use crate::response::{self, ApiResponse};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAgentRequest {
    pub name: String,
    pub contact: String,
    pub email: String,
    pub commission_rate: Option<f64>,
    pub notes: Option<String>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_agents).post(create_agent))
        .route(
            "/{id}",
            get(get_agent).put(update_agent).delete(delete_agent),
        )
        .route("/{id}/stats", get(agent_stats))
        .layer(axum::middleware::from_fn_with_state(
            state,
            admin_auth_middleware,
        ))
}

async fn list_agents(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Agent>>>, AppError> {
    let filter = AgentFilter {
        is_active: query.is_active,
        search: query.search,
    };
    let page = PageRequest::new(query.page, query.limit);
    let (agents, total) = state.agents.list(&filter, page).await?;
    Ok(response::paginated(agents, Pagination::new(page, total)))
}

async fn get_agent(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Agent>>, AppError> {
    let agent = state
        .agents
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Agent not found".to_string()))?;
    Ok(response::ok(agent))
}

/// GET /api/agents/{id}/stats — agent plus booking/revenue counters.
async fn agent_stats(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let agent = state
        .agents
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Agent not found".to_string()))?;
    let stats = state.agents.stats(id).await?;

    Ok(response::ok(json!({
        "agent": agent,
        "stats": stats,
    })))
}

async fn create_agent(
    State(state): State<AppState>,
    Json(req): Json<CreateAgentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Agent>>), AppError> {
    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.contact.trim().is_empty() {
        return Err(AppError::Validation(
            "Name, contact and email are required".to_string(),
        ));
    }
    if req.commission_rate.is_some_and(|r| !(0.0..=100.0).contains(&r)) {
        return Err(AppError::Validation(
            "Commission rate must be between 0 and 100".to_string(),
        ));
    }

    let agent = state
        .agents
        .create(&NewAgent {
            name: req.name,
            contact: req.contact,
            email: req.email,
            commission_rate: req.commission_rate.unwrap_or(0.0),
            notes: req.notes,
        })
        .await?;

    Ok(response::created(agent, "Agent created successfully"))
}

async fn update_agent(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<AgentUpdate>,
) -> Result<Json<ApiResponse<Agent>>, AppError> {
    if update
        .commission_rate
        .is_some_and(|r| !(0.0..=100.0).contains(&r))
    {
        return Err(AppError::Validation(
            "Commission rate must be between 0 and 100".to_string(),
        ));
    }

    let agent = state
        .agents
        .update(id, &update)
        .await?
        .ok_or_else(|| AppError::NotFound("Agent not found".to_string()))?;
    Ok(response::ok_message(agent, "Agent updated successfully"))
}

async fn delete_agent(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    if !state.agents.delete(id).await? {
        return Err(AppError::NotFound("Agent not found".to_string()));
    }
    Ok(response::ok_empty("Agent deleted successfully"))
}
