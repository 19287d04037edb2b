use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::leaderboard::PlayerScore,
    error::SessionError,
    state::{
        question_bank::Question,
        registry::LeaderboardEntry,
        session::{AnswerOutcome, Verdict},
    },
};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
/// Actions accepted from player WebSocket clients.
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientAction {
    /// Attach a display name to this connection.
    Register { name: String },
    /// Begin the timed round.
    StartGame,
    /// Ask for the next question.
    GetQuestion,
    /// Answer the pending question.
    Answer {
        /// Label of the chosen choice.
        answer: String,
        /// Label the client believes is correct. Advisory only.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        correct: Option<String>,
    },
    /// Ask for the current standings.
    GetLeaderboard,
    /// The client's local countdown reached zero.
    TimeUp,
    /// Any action this server does not know about.
    #[serde(other)]
    Unknown,
}

impl ClientAction {
    /// Decode an inbound text frame.
    pub fn from_json_str(text: &str) -> Result<Self, SessionError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
/// Every message the server sends to a player.
#[serde(untagged)]
pub enum ServerMessage {
    /// Acknowledgements keyed by `status`.
    Status(StatusMessage),
    /// Gameplay events keyed by `type`.
    Event(PlayerEvent),
    /// Errors reported to the player.
    Error(ErrorMessage),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
/// Acknowledgements of lifecycle actions.
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatusMessage {
    /// Registration accepted.
    Registered { name: String, total_questions: usize },
    /// Round started (or was already running).
    GameStarted { time_left: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
/// Gameplay events.
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerEvent {
    /// A new question was issued.
    Question { q: QuestionPayload },
    /// Outcome of the last answer.
    AnswerResult {
        result: AnswerResult,
        score: u32,
        time_left: u32,
    },
    /// Current standings.
    Leaderboard { players: Vec<PlayerScore> },
    /// The round ended.
    GameOver { final_score: u32, time: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
/// Question as presented to the player.
pub struct QuestionPayload {
    pub id: u32,
    pub question: String,
    pub choices: Vec<String>,
    /// Label of the correct choice, when the server is configured to expose it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
/// Verdict reported in `answer_result`.
pub enum AnswerResult {
    Correct,
    Wrong,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
/// Error reported to the player; the connection stays open.
pub struct ErrorMessage {
    pub error: String,
    pub code: String,
}

impl ServerMessage {
    /// Registration acknowledgement.
    pub fn registered(name: String, total_questions: usize) -> Self {
        Self::Status(StatusMessage::Registered {
            name,
            total_questions,
        })
    }

    /// Round start acknowledgement.
    pub fn game_started(time_left: u32) -> Self {
        Self::Status(StatusMessage::GameStarted { time_left })
    }

    /// Question event, optionally carrying the answer key.
    pub fn question(question: &Question, expose_answer_key: bool) -> Self {
        Self::Event(PlayerEvent::Question {
            q: QuestionPayload {
                id: question.id,
                question: question.prompt.clone(),
                choices: question.choices.clone(),
                answer: expose_answer_key.then(|| question.answer.clone()),
            },
        })
    }

    /// Leaderboard event built from ranked entries.
    pub fn leaderboard(entries: Vec<LeaderboardEntry>) -> Self {
        Self::Event(PlayerEvent::Leaderboard {
            players: entries.into_iter().map(PlayerScore::from).collect(),
        })
    }

    /// End-of-round event.
    pub fn game_over(final_score: u32, round_secs: u32) -> Self {
        Self::Event(PlayerEvent::GameOver {
            final_score,
            time: round_secs,
        })
    }
}

impl From<Verdict> for AnswerResult {
    fn from(value: Verdict) -> Self {
        match value {
            Verdict::Correct => AnswerResult::Correct,
            Verdict::Wrong => AnswerResult::Wrong,
        }
    }
}

impl From<&AnswerOutcome> for ServerMessage {
    fn from(outcome: &AnswerOutcome) -> Self {
        Self::Event(PlayerEvent::AnswerResult {
            result: outcome.verdict.into(),
            score: outcome.score,
            time_left: outcome.time_left,
        })
    }
}

impl From<&SessionError> for ServerMessage {
    fn from(err: &SessionError) -> Self {
        Self::Error(ErrorMessage {
            error: err.to_string(),
            code: err.code().to_string(),
        })
    }
}
