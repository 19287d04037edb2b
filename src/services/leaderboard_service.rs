//! Leaderboard projections for REST and the Server-Sent Events stream.

use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use crate::{
    dto::leaderboard::{LeaderboardQuery, LeaderboardResponse},
    state::{LeaderboardUpdate, SharedState, registry::LeaderboardEntry},
};

const EVENT_LEADERBOARD: &str = "leaderboard";

/// Ranked standings, optionally truncated to `query.limit` rows.
pub fn leaderboard(state: &SharedState, query: &LeaderboardQuery) -> LeaderboardResponse {
    let rows = match query.limit {
        Some(limit) => state.registry().top(limit),
        None => state.registry().snapshot(),
    };
    rows.into()
}

/// Convert a broadcast receiver into an SSE response: `initial` rows first, then every
/// published update until the client leaves.
pub fn to_sse_stream(
    initial: Vec<LeaderboardEntry>,
    mut receiver: broadcast::Receiver<LeaderboardUpdate>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        if let Some(event) = leaderboard_event(initial) {
            if tx.send(Ok(event)).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(rows) => {
                            let Some(event) = leaderboard_event((*rows).clone()) else {
                                continue;
                            };
                            if tx.send(Ok(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(_)) => {
                            // Skip lagged updates; a newer one follows.
                            continue;
                        }
                    }
                }
            }
        }

        info!("leaderboard SSE stream disconnected");
    });

    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn leaderboard_event(rows: Vec<LeaderboardEntry>) -> Option<Event> {
    let payload = LeaderboardResponse::from(rows);
    match Event::default().event(EVENT_LEADERBOARD).json_data(&payload) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(error = %err, "failed to encode leaderboard event");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        state::{
            AppState,
            question_bank::{QuestionBank, default_questions},
            registry::PlayerId,
        },
    };

    #[test]
    fn limit_truncates_the_ranked_rows() {
        let state = AppState::new(AppConfig::default(), QuestionBank::new(default_questions()));
        for (name, score) in [("a", 1), ("b", 3), ("c", 2)] {
            state.registry().register(PlayerId::new(), name).award(score);
        }

        let all = leaderboard(&state, &LeaderboardQuery { limit: None });
        assert_eq!(all.players.len(), 3);
        assert_eq!(all.players[0].name, "b");

        let top = leaderboard(&state, &LeaderboardQuery { limit: Some(2) });
        let names: Vec<_> = top.players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
    }
}
