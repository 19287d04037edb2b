use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::state::registry::LeaderboardEntry;

/// One ranked leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PlayerScore {
    pub name: String,
    pub score: u32,
}

impl From<LeaderboardEntry> for PlayerScore {
    fn from(value: LeaderboardEntry) -> Self {
        Self {
            name: value.name,
            score: value.score,
        }
    }
}

/// Query accepted by `GET /leaderboard`.
#[derive(Debug, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardQuery {
    /// Maximum number of rows to return; all rows when omitted.
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,
}

/// Ranked standings, highest score first, ties in registration order.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    pub players: Vec<PlayerScore>,
}

impl From<Vec<LeaderboardEntry>> for LeaderboardResponse {
    fn from(entries: Vec<LeaderboardEntry>) -> Self {
        Self {
            players: entries.into_iter().map(PlayerScore::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_bounded() {
        assert!(LeaderboardQuery { limit: None }.validate().is_ok());
        assert!(LeaderboardQuery { limit: Some(10) }.validate().is_ok());
        assert!(LeaderboardQuery { limit: Some(0) }.validate().is_err());
        assert!(LeaderboardQuery { limit: Some(101) }.validate().is_err());
    }
}
