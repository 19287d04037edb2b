//! Headless player driving one round over a real WebSocket connection.

use std::time::Duration;

use clap::ValueEnum;
use futures::{SinkExt, StreamExt};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::{
    client::round::{
        ClientCommand, ClientPhase, ClientRound, NEXT_QUESTION_DELAY, RoundEndCause, choice_label,
    },
    dto::{
        leaderboard::PlayerScore,
        ws::{ClientAction, QuestionPayload, ServerMessage},
    },
    services::round_timer::TaskScope,
};

/// How the bot picks its answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Strategy {
    /// Uniformly random choice.
    #[default]
    Random,
    /// The answer key advertised by the server, random when withheld.
    Advertised,
}

impl Strategy {
    /// Choose a label for `question`.
    pub fn pick<R: Rng + ?Sized>(self, question: &QuestionPayload, rng: &mut R) -> Option<String> {
        match self {
            Strategy::Advertised => question
                .answer
                .clone()
                .or_else(|| Strategy::Random.pick(question, rng)),
            Strategy::Random => question
                .choices
                .choose(rng)
                .and_then(|choice| choice_label(choice)),
        }
    }
}

/// Connection and pacing settings for one bot.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// WebSocket endpoint, e.g. `ws://127.0.0.1:8000/ws`.
    pub url: String,
    pub name: String,
    pub strategy: Strategy,
    /// Period of the local countdown.
    pub tick: Duration,
    /// Pause between feedback and the next question request.
    pub next_question_delay: Duration,
}

impl BotConfig {
    /// Settings matching the interactive client's pacing.
    pub fn new(url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            strategy: Strategy::default(),
            tick: Duration::from_secs(1),
            next_question_delay: NEXT_QUESTION_DELAY,
        }
    }
}

/// Outcome of a finished round.
#[derive(Debug, Clone)]
pub struct BotReport {
    pub name: String,
    pub final_score: u32,
    /// Answers sent during the round.
    pub answered: u32,
    pub ended_by: Option<RoundEndCause>,
    /// Final ranked board, listing this bot's final score.
    pub standings: Vec<PlayerScore>,
}

/// Failures that abort a bot.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("invalid server message: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("registration rejected ({code}): {message}")]
    Rejected { code: String, message: String },
    #[error("server closed the connection before the round ended")]
    Closed,
}

#[derive(Debug, Clone, Copy)]
enum BotSignal {
    Tick,
    NextQuestion,
}

/// Register, play one round, then wait for the final score and the board that shows it.
///
/// The countdown and the delayed question request live in a round-scoped [`TaskScope`],
/// cancelled as soon as the round ends locally or on the server's notice.
pub async fn run(config: BotConfig) -> Result<BotReport, BotError> {
    let (socket, _) = connect_async(config.url.as_str()).await?;
    let (mut sink, mut stream) = socket.split();
    let (signal_tx, mut signal_rx) = mpsc::unbounded_channel::<BotSignal>();

    let mut round = ClientRound::new(config.next_question_delay);
    let mut timers: Option<TaskScope> = None;
    let mut rng = StdRng::from_rng(&mut rand::rng());
    let mut answered = 0;

    send(
        &mut sink,
        &ClientAction::Register {
            name: config.name.clone(),
        },
    )
    .await?;
    info!(name = %config.name, url = %config.url, "bot connected");

    while !round.is_finished() {
        let commands = tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    let message: ServerMessage = serde_json::from_str(text.as_str())?;
                    if let ServerMessage::Error(err) = &message {
                        if round.phase() == ClientPhase::Connected {
                            return Err(BotError::Rejected {
                                code: err.code.clone(),
                                message: err.error.clone(),
                            });
                        }
                        warn!(name = %config.name, code = %err.code, error = %err.error, "server reported an error");
                    }
                    round.apply(message)
                }
                Some(Ok(Message::Close(_))) | None => return Err(BotError::Closed),
                Some(Ok(_)) => Vec::new(),
                Some(Err(err)) => return Err(err.into()),
            },
            Some(signal) = signal_rx.recv() => match signal {
                BotSignal::Tick => round.tick(),
                BotSignal::NextQuestion => round
                    .next_question()
                    .map(ClientCommand::Send)
                    .into_iter()
                    .collect(),
            },
        };

        for command in commands {
            match command {
                ClientCommand::Send(action) => send(&mut sink, &action).await?,
                ClientCommand::StartCountdown => {
                    let scope = TaskScope::new();
                    scope.every(config.tick, signal_tx.clone(), || BotSignal::Tick);
                    timers = Some(scope);
                }
                ClientCommand::Choose(question) => {
                    let action = config
                        .strategy
                        .pick(&question, &mut rng)
                        .and_then(|choice| round.answer(&choice));
                    if let Some(action) = action {
                        answered += 1;
                        send(&mut sink, &action).await?;
                    }
                }
                ClientCommand::ScheduleNextQuestion(delay) => {
                    if let Some(scope) = &timers {
                        scope.after(delay, signal_tx.clone(), BotSignal::NextQuestion);
                    }
                }
                ClientCommand::StopTimers => {
                    if let Some(scope) = timers.take() {
                        scope.cancel();
                    }
                }
            }
        }
    }

    if let Err(err) = sink.send(Message::Close(None)).await {
        debug!(error = %err, "close frame not delivered");
    }

    let report = BotReport {
        name: config.name,
        final_score: round.final_score().unwrap_or_else(|| round.score()),
        answered,
        ended_by: round.end_cause(),
        standings: round
            .final_standings()
            .map(<[PlayerScore]>::to_vec)
            .unwrap_or_default(),
    };
    info!(
        name = %report.name,
        final_score = report.final_score,
        answered = report.answered,
        "bot finished"
    );
    Ok(report)
}

async fn send<S>(sink: &mut S, action: &ClientAction) -> Result<(), BotError>
where
    S: futures::Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    let payload = serde_json::to_string(action)?;
    sink.send(Message::text(payload)).await?;
    Ok(())
}
