use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the quiz backend.
#[openapi(
    paths(
        crate::routes::status::root,
        crate::routes::status::stats,
        crate::routes::status::healthcheck,
        crate::routes::leaderboard::get_leaderboard,
        crate::routes::leaderboard::leaderboard_stream,
        crate::routes::player::ws_handler,
    ),
    components(
        schemas(
            crate::dto::status::HealthResponse,
            crate::dto::status::StatusResponse,
            crate::dto::status::StatsResponse,
            crate::dto::leaderboard::LeaderboardResponse,
            crate::dto::leaderboard::PlayerScore,
            crate::dto::ws::ClientAction,
            crate::dto::ws::ServerMessage,
        )
    ),
    tags(
        (name = "status", description = "Backend status and health"),
        (name = "leaderboard", description = "Standings across all players"),
        (name = "players", description = "WebSocket protocol for quiz players"),
    )
)]
pub struct ApiDoc;
