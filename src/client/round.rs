//! Client-side mirror of one round.
//!
//! [`ClientRound`] holds no I/O. It consumes server messages and local clock ticks and
//! answers with [`ClientCommand`]s for the driver to execute. The local countdown is
//! advisory: it ends the round on its own when the server's notice is late, and whichever
//! of the two arrives first wins.

use std::time::Duration;

use crate::dto::{
    leaderboard::PlayerScore,
    ws::{ClientAction, ErrorMessage, PlayerEvent, QuestionPayload, ServerMessage, StatusMessage},
};

/// Pause between an answer result and the next question request.
pub const NEXT_QUESTION_DELAY: Duration = Duration::from_millis(800);

/// Where the client believes the round stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientPhase {
    /// Connected, registration not acknowledged yet.
    Connected,
    /// Registered, waiting for the round to start.
    Registered,
    /// Round running locally.
    Running,
    /// Round over.
    Over,
}

/// What ended the round on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEndCause {
    /// The local countdown reached zero first.
    LocalClock,
    /// `game_over` arrived first.
    ServerNotice,
}

/// Work requested from the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    /// Send an action to the server.
    Send(ClientAction),
    /// Start ticking [`ClientRound::tick`] once per second.
    StartCountdown,
    /// A question is on screen; pick a choice and call [`ClientRound::answer`].
    Choose(QuestionPayload),
    /// Call [`ClientRound::next_question`] after the delay, unless the round ends first.
    ScheduleNextQuestion(Duration),
    /// Cancel the countdown and any scheduled continuation.
    StopTimers,
}

/// Pure state of one round as seen from the player's side.
#[derive(Debug, Clone)]
pub struct ClientRound {
    phase: ClientPhase,
    name: Option<String>,
    time_left: u32,
    score: u32,
    current: Option<QuestionPayload>,
    awaiting_result: bool,
    end_cause: Option<RoundEndCause>,
    final_score: Option<u32>,
    standings: Vec<PlayerScore>,
    final_standings: Option<Vec<PlayerScore>>,
    last_error: Option<ErrorMessage>,
    next_question_delay: Duration,
}

impl Default for ClientRound {
    fn default() -> Self {
        Self::new(NEXT_QUESTION_DELAY)
    }
}

impl ClientRound {
    /// Fresh round that waits `next_question_delay` between feedback and the next question.
    pub fn new(next_question_delay: Duration) -> Self {
        Self {
            phase: ClientPhase::Connected,
            name: None,
            time_left: 0,
            score: 0,
            current: None,
            awaiting_result: false,
            end_cause: None,
            final_score: None,
            standings: Vec::new(),
            final_standings: None,
            last_error: None,
            next_question_delay,
        }
    }

    pub fn phase(&self) -> ClientPhase {
        self.phase
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Question currently displayed, if any.
    pub fn current_question(&self) -> Option<&QuestionPayload> {
        self.current.as_ref()
    }

    pub fn end_cause(&self) -> Option<RoundEndCause> {
        self.end_cause
    }

    /// Score reported by `game_over`.
    pub fn final_score(&self) -> Option<u32> {
        self.final_score
    }

    /// Last leaderboard received.
    pub fn standings(&self) -> &[PlayerScore] {
        &self.standings
    }

    pub fn last_error(&self) -> Option<&ErrorMessage> {
        self.last_error.as_ref()
    }

    /// Name acknowledged by the server.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Ranked board received after `game_over` that lists this player's final score.
    pub fn final_standings(&self) -> Option<&[PlayerScore]> {
        self.final_standings.as_deref()
    }

    /// True once the final score and the board reflecting it have both arrived.
    pub fn is_finished(&self) -> bool {
        self.final_standings.is_some()
    }

    /// Apply one server message.
    pub fn apply(&mut self, message: ServerMessage) -> Vec<ClientCommand> {
        match message {
            ServerMessage::Status(StatusMessage::Registered { name, .. }) => {
                if self.phase != ClientPhase::Connected {
                    return Vec::new();
                }
                self.phase = ClientPhase::Registered;
                self.name = Some(name);
                vec![ClientCommand::Send(ClientAction::StartGame)]
            }
            ServerMessage::Status(StatusMessage::GameStarted { time_left }) => {
                if self.phase != ClientPhase::Registered {
                    return Vec::new();
                }
                self.phase = ClientPhase::Running;
                self.time_left = time_left;
                vec![
                    ClientCommand::StartCountdown,
                    ClientCommand::Send(ClientAction::GetQuestion),
                ]
            }
            ServerMessage::Event(PlayerEvent::Question { q }) => {
                // A second question while one is displayed would be shown twice.
                if self.phase != ClientPhase::Running || self.current.is_some() {
                    return Vec::new();
                }
                self.current = Some(q.clone());
                vec![ClientCommand::Choose(q)]
            }
            ServerMessage::Event(PlayerEvent::AnswerResult {
                score, time_left, ..
            }) => {
                self.score = score;
                self.current = None;
                self.awaiting_result = false;
                if self.phase != ClientPhase::Running {
                    return Vec::new();
                }
                self.time_left = time_left;
                vec![ClientCommand::ScheduleNextQuestion(self.next_question_delay)]
            }
            ServerMessage::Event(PlayerEvent::Leaderboard { players }) => {
                if self.final_standings.is_none() && self.shows_final_score(&players) {
                    self.final_standings = Some(players.clone());
                }
                self.standings = players;
                Vec::new()
            }
            ServerMessage::Event(PlayerEvent::GameOver { final_score, .. }) => {
                self.final_score = Some(final_score);
                self.score = final_score;
                self.current = None;
                self.awaiting_result = false;
                let mut commands = Vec::with_capacity(2);
                if self.finish(RoundEndCause::ServerNotice) {
                    commands.push(ClientCommand::StopTimers);
                }
                commands.push(ClientCommand::Send(ClientAction::GetLeaderboard));
                commands
            }
            ServerMessage::Error(err) => {
                self.last_error = Some(err);
                Vec::new()
            }
        }
    }

    /// Advance the local countdown by one second.
    pub fn tick(&mut self) -> Vec<ClientCommand> {
        if self.phase != ClientPhase::Running {
            return Vec::new();
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left > 0 || !self.finish(RoundEndCause::LocalClock) {
            return Vec::new();
        }
        vec![
            ClientCommand::StopTimers,
            ClientCommand::Send(ClientAction::TimeUp),
        ]
    }

    /// Answer the displayed question with `choice`.
    ///
    /// Returns `None` when no question awaits an answer.
    pub fn answer(&mut self, choice: &str) -> Option<ClientAction> {
        if self.phase != ClientPhase::Running || self.awaiting_result {
            return None;
        }
        let question = self.current.as_ref()?;
        self.awaiting_result = true;
        Some(ClientAction::Answer {
            answer: choice.to_owned(),
            correct: question.answer.clone(),
        })
    }

    /// Scheduled continuation after feedback.
    ///
    /// Returns `None` if the round ended during the wait.
    pub fn next_question(&self) -> Option<ClientAction> {
        (self.phase == ClientPhase::Running && self.current.is_none() && !self.awaiting_result)
            .then_some(ClientAction::GetQuestion)
    }

    fn shows_final_score(&self, players: &[PlayerScore]) -> bool {
        let (Some(name), Some(score)) = (self.name.as_deref(), self.final_score) else {
            return false;
        };
        players
            .iter()
            .any(|row| row.name == name && row.score == score)
    }

    fn finish(&mut self, cause: RoundEndCause) -> bool {
        if self.phase == ClientPhase::Over {
            return false;
        }
        self.phase = ClientPhase::Over;
        self.end_cause = Some(cause);
        true
    }
}

/// Label of a displayed choice such as `"B) Mars"`.
pub fn choice_label(choice: &str) -> Option<String> {
    let (label, _) = choice.split_once(')')?;
    let label = label.trim();
    (!label.is_empty()).then(|| label.to_uppercase())
}
