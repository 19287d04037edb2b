use std::convert::Infallible;

use axum::{
    Json, Router,
    extract::{Query, State},
    response::sse::{Event, Sse},
    routing::get,
};
use futures::Stream;
use tracing::info;
use validator::Validate;

use crate::{
    dto::leaderboard::{LeaderboardQuery, LeaderboardResponse},
    error::AppError,
    services::leaderboard_service,
    state::SharedState,
};

/// Standings as a snapshot and as a live stream.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/leaderboard", get(get_leaderboard))
        .route("/sse/leaderboard", get(leaderboard_stream))
}

#[utoipa::path(
    get,
    path = "/leaderboard",
    tag = "leaderboard",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Ranked standings", body = LeaderboardResponse),
        (status = 400, description = "Invalid limit")
    )
)]
/// Return the standings, highest score first.
pub async fn get_leaderboard(
    State(state): State<SharedState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    query.validate()?;
    Ok(Json(leaderboard_service::leaderboard(&state, &query)))
}

#[utoipa::path(
    get,
    path = "/sse/leaderboard",
    tag = "leaderboard",
    responses((status = 200, description = "`leaderboard` events carrying `LeaderboardResponse`", content_type = "text/event-stream", body = String))
)]
/// Stream leaderboard updates to spectators.
pub async fn leaderboard_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("new leaderboard SSE connection");
    // Subscribe before reading the rows so no update published in between is lost.
    let receiver = state.leaderboard_hub().subscribe();
    let initial = state.registry().top(state.config().leaderboard_size);
    leaderboard_service::to_sse_stream(initial, receiver)
}
