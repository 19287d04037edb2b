use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::status::{HealthResponse, StatsResponse, StatusResponse},
    services::status_service,
    state::SharedState,
};

/// Landing, statistics and health endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/", get(root))
        .route("/stats", get(stats))
        .route("/healthcheck", get(healthcheck))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "status",
    responses((status = 200, description = "Backend status", body = StatusResponse))
)]
/// Report that the backend runs, with question and player counts.
pub async fn root(State(state): State<SharedState>) -> Json<StatusResponse> {
    Json(status_service::status(&state))
}

#[utoipa::path(
    get,
    path = "/stats",
    tag = "status",
    responses((status = 200, description = "Aggregate statistics", body = StatsResponse))
)]
/// Return question and player counts with the top of the leaderboard.
pub async fn stats(State(state): State<SharedState>) -> Json<StatsResponse> {
    Json(status_service::stats(&state))
}

#[utoipa::path(
    get,
    path = "/healthcheck",
    tag = "status",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
/// Liveness probe.
pub async fn healthcheck() -> Json<HealthResponse> {
    Json(status_service::health())
}
