use axum::{
    extract::{Path, Query, State},
    http::{Method, Uri},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::aggregate::{
    AgentListing, HealthReport, LogListing, LogParams, LogQuery, SessionListing, SessionParams,
    SessionQuery,
};
use crate::api::error::ApiError;
use crate::api::server::AppState;
use crate::api::timestamp;
use crate::types::{AgentDetail, OverviewAggregate};

pub const ENDPOINTS: [&str; 8] = [
    "GET /health",
    "GET /api/overview",
    "GET /api/agents",
    "GET /api/agents/:id",
    "GET /api/health",
    "GET /api/logs?limit=10&level=all&agent=",
    "GET /api/sessions?agent=&active=true",
    "GET /",
];

/// Success body: the payload's fields next to `timestamp`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub timestamp: String,
    #[serde(flatten)]
    pub payload: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(payload: T) -> Json<Self> {
        Json(Self {
            timestamp: timestamp(),
            payload,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct AgentPayload {
    pub agent: AgentDetail,
}

pub async fn discovery() -> Json<Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": ENDPOINTS,
    }))
}

pub async fn liveness() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": timestamp(),
    }))
}

pub async fn overview(
    State(state): State<AppState>,
) -> Result<Json<Envelope<OverviewAggregate>>, ApiError> {
    let overview = state.dashboard.overview().await.map_err(|e| {
        ApiError::from_dashboard(e, "Failed to build overview", state.expose_error_details)
            .with_defaults(json!({
                "agents": [],
                "health": null,
                "logs": [],
                "totals": { "agents": 0, "activeAgents": 0, "totalTokens": 0, "totalSessions": 0 },
            }))
    })?;

    Ok(Envelope::new(overview))
}

pub async fn list_agents(
    State(state): State<AppState>,
) -> Result<Json<Envelope<AgentListing>>, ApiError> {
    let listing = state.dashboard.agents().await.map_err(|e| {
        ApiError::from_dashboard(e, "Failed to fetch agents", state.expose_error_details)
            .with_defaults(json!({
                "agents": [],
                "totals": { "agents": 0, "activeAgents": 0, "totalTokens": 0, "totalSessions": 0 },
            }))
    })?;

    Ok(Envelope::new(listing))
}

pub async fn get_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<AgentPayload>>, ApiError> {
    let agent = state
        .dashboard
        .agent(&id)
        .await
        .map_err(|e| {
            ApiError::from_dashboard(e, "Failed to fetch agent", state.expose_error_details)
        })?;

    Ok(Envelope::new(AgentPayload { agent }))
}

pub async fn health(
    State(state): State<AppState>,
) -> Result<Json<Envelope<HealthReport>>, ApiError> {
    let report = state.dashboard.health().await.map_err(|e| {
        ApiError::from_dashboard(e, "Failed to fetch health", state.expose_error_details)
            .with_defaults(json!({
                "gateway": { "status": "error" },
                "channels": {},
                "overall": "critical",
                "indicators": { "gateway": "red", "channels": "unknown", "errors": "unknown" },
            }))
    })?;

    Ok(Envelope::new(report))
}

pub async fn logs(
    State(state): State<AppState>,
    Query(params): Query<LogParams>,
) -> Result<Json<Envelope<LogListing>>, ApiError> {
    let query = LogQuery::from(params);
    let listing = state.dashboard.logs(&query).await.map_err(|e| {
        ApiError::from_dashboard(e, "Failed to fetch logs", state.expose_error_details)
            .with_defaults(json!({
                "logs": [],
                "summary": { "total": 0, "errors": 0, "warnings": 0 },
            }))
    })?;

    Ok(Envelope::new(listing))
}

pub async fn sessions(
    State(state): State<AppState>,
    Query(params): Query<SessionParams>,
) -> Result<Json<Envelope<SessionListing>>, ApiError> {
    let query = SessionQuery::from(params);
    let listing = state.dashboard.sessions(&query).await.map_err(|e| {
        ApiError::from_dashboard(e, "Failed to fetch sessions", state.expose_error_details)
            .with_defaults(json!({
                "sessions": [],
                "totals": { "sessions": 0, "activeSessions": 0, "totalTokens": 0 },
            }))
    })?;

    Ok(Envelope::new(listing))
}

pub async fn not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::not_found(format!("Endpoint not found: {} {}", method, uri))
}
