//! Message-level contract between one player connection and its session.
//!
//! Inbound actions and timer signals are applied one at a time, in arrival order, by the
//! connection task that owns the [`PlayerGateway`]. Every state change is turned into
//! outbound events on the connection's writer channel.

use axum::extract::ws::Message;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    dto::ws::{ClientAction, ServerMessage},
    error::SessionError,
    services::round_timer::TaskScope,
    state::{
        SharedState,
        registry::{LeaderboardEntry, PlayerId},
        session::{EndTrigger, RoundEnd, Session, StartOutcome, Tick},
    },
};

/// Signals produced by the connection's own timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundSignal {
    /// One countdown period elapsed.
    Tick,
    /// The post-expiry answer window closed.
    GraceElapsed,
}

/// Per-connection dispatcher owning the player's session and its timers.
pub struct PlayerGateway {
    state: SharedState,
    session: Session,
    outbound: mpsc::UnboundedSender<Message>,
    signals: mpsc::UnboundedSender<RoundSignal>,
    countdown: Option<TaskScope>,
    grace: Option<TaskScope>,
}

impl PlayerGateway {
    /// Attach a fresh, unregistered session to a connection.
    pub fn new(
        state: SharedState,
        id: PlayerId,
        outbound: mpsc::UnboundedSender<Message>,
        signals: mpsc::UnboundedSender<RoundSignal>,
    ) -> Self {
        let session = Session::new(id, state.registry().clone(), state.round_rules());
        Self {
            state,
            session,
            outbound,
            signals,
            countdown: None,
            grace: None,
        }
    }

    /// Session driven by this gateway.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Decode and apply one inbound text frame.
    ///
    /// Only a transport failure is returned; every other error is scoped to the action,
    /// logged, and reported to the player when relevant.
    pub fn handle_text(&mut self, text: &str) -> Result<(), SessionError> {
        let outcome = ClientAction::from_json_str(text).and_then(|action| self.dispatch(action));
        self.settle(outcome)
    }

    /// Apply a timer signal.
    pub fn handle_signal(&mut self, signal: RoundSignal) -> Result<(), SessionError> {
        match signal {
            RoundSignal::Tick => match self.session.tick() {
                Tick::Running(left) => {
                    debug!(player = %self.session.id(), time_left = left, "tick");
                    Ok(())
                }
                Tick::Expired(end) => self.on_round_end(end),
                Tick::Idle => Ok(()),
            },
            RoundSignal::GraceElapsed => {
                if !self.session.close_grace() {
                    return Ok(());
                }
                info!(player = %self.session.id(), "answer grace elapsed without an answer");
                self.finish_round()
            }
        }
    }

    /// Push a leaderboard update from the shared hub to this player.
    pub fn forward_leaderboard(&self, rows: &[LeaderboardEntry]) -> Result<(), SessionError> {
        self.send(&ServerMessage::leaderboard(rows.to_vec()))
    }

    /// Tear the session down after the connection closed.
    pub fn close(mut self) {
        if let Some(countdown) = self.countdown.take() {
            countdown.cancel();
        }
        if let Some(grace) = self.grace.take() {
            grace.cancel();
        }

        let id = self.session.id();
        if self.state.registry().remove(&id) {
            info!(
                player = %id,
                final_score = self.session.score(),
                "player left; removed from registry"
            );
            self.state.publish_leaderboard();
        }
    }

    fn settle(&mut self, outcome: Result<(), SessionError>) -> Result<(), SessionError> {
        match outcome {
            Ok(()) => Ok(()),
            Err(err @ SessionError::TransportFailure(_)) => Err(err),
            Err(err) => {
                warn!(player = %self.session.id(), error = %err, "action rejected");
                if err.is_reported() {
                    self.send(&ServerMessage::from(&err))?;
                }
                Ok(())
            }
        }
    }

    fn dispatch(&mut self, action: ClientAction) -> Result<(), SessionError> {
        match action {
            ClientAction::Register { name } => {
                let name = self.session.register(&name)?;
                info!(player = %self.session.id(), name = %name, "player registered");
                self.send(&ServerMessage::registered(
                    name,
                    self.state.questions().len(),
                ))?;
                self.state.publish_leaderboard();
                Ok(())
            }
            ClientAction::StartGame => match self.session.start()? {
                StartOutcome::Started { time_left } => {
                    let countdown = TaskScope::new();
                    countdown.every(
                        self.state.config().tick_interval,
                        self.signals.clone(),
                        || RoundSignal::Tick,
                    );
                    self.countdown = Some(countdown);
                    info!(player = %self.session.id(), time_left, "round started");
                    self.send(&ServerMessage::game_started(time_left))
                }
                StartOutcome::AlreadyActive => {
                    debug!(player = %self.session.id(), "start ignored; round already running");
                    Ok(())
                }
            },
            ClientAction::GetQuestion => {
                let question = self
                    .session
                    .request_question(self.state.questions(), &mut rand::rng())?;
                debug!(player = %self.session.id(), question = question.id, "question issued");
                self.send(&ServerMessage::question(
                    &question,
                    self.state.config().expose_answer_key,
                ))
            }
            ClientAction::Answer { answer, correct } => {
                let outcome = self.session.answer(&answer, correct.as_deref())?;
                debug!(
                    player = %self.session.id(),
                    question = outcome.question.id,
                    verdict = ?outcome.verdict,
                    score = outcome.score,
                    "answer scored"
                );
                self.send(&ServerMessage::from(&outcome))?;
                self.state.publish_leaderboard();
                if outcome.after_expiry {
                    return self.finish_round();
                }
                Ok(())
            }
            ClientAction::GetLeaderboard => {
                self.send(&ServerMessage::leaderboard(self.state.registry().snapshot()))
            }
            ClientAction::TimeUp => match self.session.end_round(EndTrigger::ClientClock) {
                Some(end) => self.on_round_end(end),
                None => {
                    debug!(player = %self.session.id(), "time_up ignored; no round running");
                    Ok(())
                }
            },
            ClientAction::Unknown => {
                debug!(player = %self.session.id(), "ignoring unknown action");
                Ok(())
            }
        }
    }

    fn on_round_end(&mut self, end: RoundEnd) -> Result<(), SessionError> {
        if let Some(countdown) = self.countdown.take() {
            countdown.cancel();
        }
        info!(
            player = %self.session.id(),
            trigger = ?end.trigger,
            final_score = end.final_score,
            awaiting_answer = end.awaiting_answer,
            "round ended"
        );

        if !end.awaiting_answer {
            return self.finish_round();
        }

        let grace = TaskScope::new();
        grace.after(
            self.state.config().answer_grace,
            self.signals.clone(),
            RoundSignal::GraceElapsed,
        );
        self.grace = Some(grace);
        Ok(())
    }

    fn finish_round(&mut self) -> Result<(), SessionError> {
        if let Some(grace) = self.grace.take() {
            grace.cancel();
        }
        self.send(&ServerMessage::game_over(
            self.session.score(),
            self.state.config().round_duration_secs,
        ))?;
        self.state.publish_leaderboard();
        Ok(())
    }

    fn send(&self, message: &ServerMessage) -> Result<(), SessionError> {
        send_message_to_websocket(&self.outbound, message)
    }
}

/// Serialize a payload and push it onto the provided WebSocket sender.
///
/// A serialization failure is a bug and is only logged; a closed writer channel means the
/// connection is gone and is returned as [`SessionError::TransportFailure`].
pub fn send_message_to_websocket<T>(
    tx: &mpsc::UnboundedSender<Message>,
    value: &T,
) -> Result<(), SessionError>
where
    T: ?Sized + serde::Serialize + std::fmt::Debug,
{
    let payload = match serde_json::to_string(value) {
        Ok(p) => p,
        Err(err) => {
            warn!(error = %err, "failed to serialize message `{value:?}`");
            return Ok(());
        }
    };

    tx.send(Message::Text(payload.into()))
        .map_err(|_| SessionError::TransportFailure("writer channel closed".into()))
}
