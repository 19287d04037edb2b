use axum::Router;

use crate::state::SharedState;

pub mod docs;
pub mod leaderboard;
pub mod player;
pub mod status;

/// HTTP surface: status pages, leaderboard (REST and SSE), the player socket and docs.
pub fn router(state: SharedState) -> Router<()> {
    Router::<SharedState>::new()
        .merge(status::router())
        .merge(leaderboard::router())
        .merge(player::router())
        .merge(docs::router())
        .with_state(state)
}
