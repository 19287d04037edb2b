use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{
    sync::{broadcast::error::RecvError, mpsc},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    error::SessionError,
    services::gateway::{PlayerGateway, RoundSignal},
    state::{SharedState, registry::PlayerId},
};

/// Handle the full lifecycle for an individual player WebSocket connection.
///
/// Inbound frames, timer signals and leaderboard pushes are multiplexed onto this single
/// task, so the player's session only ever sees one event at a time.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();
    let (signal_tx, mut signal_rx) = mpsc::unbounded_channel::<RoundSignal>();

    // Dedicated writer task keeps outbound messages flowing even while we await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let player_id = PlayerId::new();
    let mut leaderboard_rx = state.leaderboard_hub().subscribe();
    let mut gateway = PlayerGateway::new(state.clone(), player_id, outbound_tx.clone(), signal_tx);
    info!(player = %player_id, "player connected");

    loop {
        let result = tokio::select! {
            inbound = receiver.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    debug!(player = %player_id, payload = %text.as_str(), "received player message");
                    gateway.handle_text(text.as_str())
                }
                Some(Ok(Message::Ping(payload))) => {
                    let _ = outbound_tx.send(Message::Pong(payload));
                    Ok(())
                }
                Some(Ok(Message::Close(frame))) => {
                    info!(player = %player_id, "player closed the connection");
                    let _ = outbound_tx.send(Message::Close(frame));
                    break;
                }
                Some(Ok(Message::Binary(_) | Message::Pong(_))) => Ok(()),
                Some(Err(err)) => Err(SessionError::TransportFailure(err.to_string())),
                None => break,
            },
            Some(signal) = signal_rx.recv() => gateway.handle_signal(signal),
            update = leaderboard_rx.recv() => match update {
                Ok(rows) => gateway.forward_leaderboard(&rows),
                Err(RecvError::Lagged(skipped)) => {
                    // A newer snapshot is already queued behind the skipped ones.
                    debug!(player = %player_id, skipped, "leaderboard updates lagged");
                    Ok(())
                }
                Err(RecvError::Closed) => break,
            },
        };

        if let Err(err) = result {
            warn!(player = %player_id, error = %err, "connection failed");
            break;
        }
    }

    gateway.close();
    info!(player = %player_id, "player disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
