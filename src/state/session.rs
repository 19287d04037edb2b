//! Per-player round state machine.
//!
//! A session moves `Unregistered → Registered → Active → Ended`. While active it runs a
//! strict question/answer cycle: at most one question is outstanding, and a new one is only
//! issued once the previous answer has been scored. `Ended` is terminal, with a single
//! exception: the question that was outstanding at expiry may still be answered once while
//! the grace window is open.

use std::sync::Arc;

use rand::Rng;
use thiserror::Error;
use tracing::warn;

use crate::{
    config::AppConfig,
    dto::validation::validate_display_name,
    error::SessionError,
    state::{
        question_bank::{Question, QuestionBank, QuestionId},
        registry::{PlayerId, ScoreCard, SessionRegistry},
    },
};

/// Lifecycle phases of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Connected, no display name yet.
    Unregistered,
    /// Named and listed in the registry, round not started.
    Registered,
    /// Round running: countdown ticking, questions flowing.
    Active,
    /// Round over; scores are frozen.
    Ended,
}

/// What ended a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndTrigger {
    /// The server countdown reached zero.
    ServerClock,
    /// The client reported that its local countdown reached zero.
    ClientClock,
}

/// Events that move a session between phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Player supplied a display name.
    Register,
    /// Player started the round.
    Start,
    /// The round timed out.
    End(EndTrigger),
}

/// Error returned when an event cannot be applied in the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// Phase the session was in.
    pub from: SessionPhase,
    /// Rejected event.
    pub event: SessionEvent,
}

impl From<InvalidTransition> for SessionError {
    fn from(err: InvalidTransition) -> Self {
        SessionError::ProtocolViolation(err.to_string())
    }
}

/// Scoring and timing parameters of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundRules {
    /// Round length in seconds.
    pub duration_secs: u32,
    /// Points added per correct answer.
    pub points_per_correct: u32,
    /// Maximum display name length.
    pub max_name_len: usize,
}

impl Default for RoundRules {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for RoundRules {
    fn from(config: &AppConfig) -> Self {
        Self {
            duration_secs: config.round_duration_secs,
            points_per_correct: config.points_per_correct,
            max_name_len: config.max_name_len,
        }
    }
}

/// Result of a `start` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// The round began with the given number of seconds on the clock.
    Started {
        /// Seconds remaining at start.
        time_left: u32,
    },
    /// A round is already running; nothing changed.
    AlreadyActive,
}

/// Outcome of comparing a submitted choice with the issued question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Choice matched the server-held key.
    Correct,
    /// Choice did not match.
    Wrong,
}

/// Scored answer, ready to be reported to the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    /// Whether the answer was right.
    pub verdict: Verdict,
    /// Score after applying the answer.
    pub score: u32,
    /// Seconds left on the round clock.
    pub time_left: u32,
    /// Question the answer was scored against.
    pub question: Arc<Question>,
    /// Whether the answer landed inside the post-expiry grace window.
    pub after_expiry: bool,
}

/// Summary of a round that just ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundEnd {
    /// What ended the round.
    pub trigger: EndTrigger,
    /// Score at the moment of expiry.
    pub final_score: u32,
    /// A question was outstanding and may still be answered during the grace window.
    pub awaiting_answer: bool,
}

/// Effect of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Round still running with this many seconds left.
    Running(u32),
    /// This tick exhausted the clock.
    Expired(RoundEnd),
    /// No round is running; the tick was ignored.
    Idle,
}

/// State of one player's round.
#[derive(Debug)]
pub struct Session {
    id: PlayerId,
    registry: SessionRegistry,
    rules: RoundRules,
    phase: SessionPhase,
    card: Option<Arc<ScoreCard>>,
    score: u32,
    time_remaining: u32,
    current_question: Option<Arc<Question>>,
    last_question: Option<QuestionId>,
    grace_open: bool,
}

impl Session {
    /// Create an unregistered session for a fresh connection.
    pub fn new(id: PlayerId, registry: SessionRegistry, rules: RoundRules) -> Self {
        Self {
            id,
            registry,
            rules,
            phase: SessionPhase::Unregistered,
            card: None,
            score: 0,
            time_remaining: rules.duration_secs,
            current_question: None,
            last_question: None,
            grace_open: false,
        }
    }

    /// Identity of the owning connection.
    pub fn id(&self) -> PlayerId {
        self.id
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Registered display name, if any.
    pub fn name(&self) -> Option<&str> {
        self.card.as_ref().map(|card| card.name())
    }

    /// Running score of the current round.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Seconds left on the round clock.
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    /// Question waiting for an answer, if any.
    pub fn current_question(&self) -> Option<&Arc<Question>> {
        self.current_question.as_ref()
    }

    /// Whether a question has been issued and not yet scored.
    pub fn pending_answer(&self) -> bool {
        self.current_question.is_some()
    }

    /// Whether an answer to the question outstanding at expiry is still accepted.
    pub fn grace_open(&self) -> bool {
        self.grace_open
    }

    /// Register (or rename, before the round starts) under `raw_name`.
    ///
    /// The registry entry for this identity is created or overwritten. Returns the trimmed name.
    pub fn register(&mut self, raw_name: &str) -> Result<String, SessionError> {
        let name = raw_name.trim();
        validate_display_name(name, self.rules.max_name_len).map_err(|err| {
            SessionError::InvalidName(
                err.message
                    .map(|message| message.into_owned())
                    .unwrap_or_else(|| err.code.into_owned()),
            )
        })?;

        self.phase = self.transition(SessionEvent::Register)?;
        self.card = Some(self.registry.register(self.id, name));
        self.score = 0;
        Ok(name.to_string())
    }

    /// Start the round. Starting an already running round is a no-op.
    pub fn start(&mut self) -> Result<StartOutcome, SessionError> {
        if self.phase == SessionPhase::Active {
            return Ok(StartOutcome::AlreadyActive);
        }

        self.phase = self.transition(SessionEvent::Start)?;
        self.score = 0;
        self.time_remaining = self.rules.duration_secs;
        self.current_question = None;
        self.last_question = None;
        if let Some(card) = &self.card {
            card.reset();
        }

        Ok(StartOutcome::Started {
            time_left: self.time_remaining,
        })
    }

    /// Issue the next question, unless one is already pending.
    pub fn request_question<R: Rng + ?Sized>(
        &mut self,
        bank: &QuestionBank,
        rng: &mut R,
    ) -> Result<Arc<Question>, SessionError> {
        match self.phase {
            SessionPhase::Active => {}
            SessionPhase::Ended => {
                return Err(SessionError::ProtocolViolation(
                    "round is over; no further questions".into(),
                ));
            }
            phase => {
                return Err(SessionError::ProtocolViolation(format!(
                    "questions are only issued during a round (session is {phase:?})"
                )));
            }
        }

        if let Some(pending) = &self.current_question {
            return Err(SessionError::ProtocolViolation(format!(
                "question {} is still waiting for an answer",
                pending.id
            )));
        }

        let question = bank
            .draw(self.last_question, rng)
            .ok_or(SessionError::NoQuestions)?;
        self.last_question = Some(question.id);
        self.current_question = Some(question.clone());
        Ok(question)
    }

    /// Score `choice` against the server-held key of the pending question.
    ///
    /// `claimed_key` is the key the client believes is correct. It is only compared for
    /// logging and never affects the verdict.
    pub fn answer(
        &mut self,
        choice: &str,
        claimed_key: Option<&str>,
    ) -> Result<AnswerOutcome, SessionError> {
        let after_expiry = match self.phase {
            SessionPhase::Active => false,
            SessionPhase::Ended if self.grace_open => true,
            SessionPhase::Ended => {
                return Err(SessionError::ProtocolViolation(
                    "round is over; answer ignored".into(),
                ));
            }
            phase => {
                return Err(SessionError::ProtocolViolation(format!(
                    "no round running (session is {phase:?})"
                )));
            }
        };

        let question = self.current_question.take().ok_or_else(|| {
            SessionError::ProtocolViolation("answer submitted with no question pending".into())
        })?;
        self.grace_open = false;

        if let Some(claimed) = claimed_key.filter(|claimed| !question.is_correct(claimed)) {
            warn!(
                player = %self.id,
                question = question.id,
                claimed = %claimed,
                "client-reported answer key disagrees with the issued question"
            );
        }

        let verdict = if question.is_correct(choice) {
            self.award(self.rules.points_per_correct);
            Verdict::Correct
        } else {
            Verdict::Wrong
        };

        Ok(AnswerOutcome {
            verdict,
            score: self.score,
            time_left: self.time_remaining,
            question,
            after_expiry,
        })
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> Tick {
        if self.phase != SessionPhase::Active {
            return Tick::Idle;
        }

        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining > 0 {
            return Tick::Running(self.time_remaining);
        }

        match self.end_round(EndTrigger::ServerClock) {
            Some(end) => Tick::Expired(end),
            None => Tick::Idle,
        }
    }

    /// End the round. Returns `None` when the round is not running, so a second trigger is a no-op.
    pub fn end_round(&mut self, trigger: EndTrigger) -> Option<RoundEnd> {
        self.phase = self.transition(SessionEvent::End(trigger)).ok()?;
        self.time_remaining = 0;
        self.grace_open = self.current_question.is_some();

        Some(RoundEnd {
            trigger,
            final_score: self.score,
            awaiting_answer: self.grace_open,
        })
    }

    /// Close the grace window, discarding the unanswered question. Returns whether it was open.
    pub fn close_grace(&mut self) -> bool {
        if !self.grace_open {
            return false;
        }
        self.grace_open = false;
        self.current_question = None;
        true
    }

    fn award(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
        if let Some(card) = &self.card {
            card.award(points);
        }
    }

    fn transition(&self, event: SessionEvent) -> Result<SessionPhase, InvalidTransition> {
        let next = match (self.phase, event) {
            (SessionPhase::Unregistered | SessionPhase::Registered, SessionEvent::Register) => {
                SessionPhase::Registered
            }
            (SessionPhase::Registered, SessionEvent::Start) => SessionPhase::Active,
            (SessionPhase::Active, SessionEvent::End(_)) => SessionPhase::Ended,
            (from, event) => return Err(InvalidTransition { from, event }),
        };
        Ok(next)
    }
}
