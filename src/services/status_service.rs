use crate::{
    dto::{
        leaderboard::PlayerScore,
        status::{HealthResponse, StatsResponse, StatusResponse},
    },
    state::SharedState,
};

/// Landing payload: question count and number of registered players.
pub fn status(state: &SharedState) -> StatusResponse {
    StatusResponse {
        status: "Sprint Quiz Backend Running".to_string(),
        questions_loaded: state.questions().len(),
        active_players: state.registry().len(),
    }
}

/// Aggregate statistics with the top of the leaderboard.
pub fn stats(state: &SharedState) -> StatsResponse {
    StatsResponse {
        total_questions: state.questions().len(),
        active_players: state.registry().len(),
        leaderboard: state
            .registry()
            .top(state.config().leaderboard_size)
            .into_iter()
            .map(PlayerScore::from)
            .collect(),
    }
}

/// Static liveness payload.
pub fn health() -> HealthResponse {
    HealthResponse {
        status: "ok".to_string(),
    }
}
