use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::leaderboard::PlayerScore;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests.
    pub status: String,
}

/// Landing payload returned by `GET /`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
    pub questions_loaded: usize,
    pub active_players: usize,
}

/// Aggregate statistics returned by `GET /stats`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub total_questions: usize,
    pub active_players: usize,
    /// Top of the leaderboard, capped at the configured size.
    pub leaderboard: Vec<PlayerScore>,
}
