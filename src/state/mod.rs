pub mod hub;
pub mod question_bank;
pub mod registry;
pub mod session;

use std::sync::Arc;

use tracing::debug;

use crate::config::AppConfig;

pub use self::hub::{LeaderboardHub, LeaderboardUpdate};
use self::{
    question_bank::QuestionBank,
    registry::SessionRegistry,
    session::RoundRules,
};

pub type SharedState = Arc<AppState>;

/// Buffered leaderboard updates per subscriber before it starts lagging.
const LEADERBOARD_CAPACITY: usize = 64;

/// Process-wide state shared by every connection: configuration, questions and the registry.
pub struct AppState {
    config: AppConfig,
    questions: QuestionBank,
    registry: SessionRegistry,
    leaderboard: LeaderboardHub,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig, questions: QuestionBank) -> SharedState {
        Arc::new(Self {
            config,
            questions,
            registry: SessionRegistry::new(),
            leaderboard: LeaderboardHub::new(LEADERBOARD_CAPACITY),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Question pool shared by all sessions.
    pub fn questions(&self) -> &QuestionBank {
        &self.questions
    }

    /// Registry of every registered session.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Hub carrying leaderboard pushes.
    pub fn leaderboard_hub(&self) -> &LeaderboardHub {
        &self.leaderboard
    }

    /// Scoring and timing rules applied to new sessions.
    pub fn round_rules(&self) -> RoundRules {
        RoundRules::from(&self.config)
    }

    /// Recompute the top of the leaderboard and push it to every subscriber.
    pub fn publish_leaderboard(&self) {
        let rows = self.registry.top(self.config.leaderboard_size);
        debug!(rows = rows.len(), "publishing leaderboard");
        self.leaderboard.broadcast(rows);
    }
}
