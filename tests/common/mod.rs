//! Shared helpers: boot the app on an ephemeral port and talk to it as a player.

#![allow(dead_code)]

use std::{net::SocketAddr, time::Duration};

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::{net::TcpListener, time::timeout};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use sprint_quiz_back::{
    build_router,
    config::AppConfig,
    state::{
        AppState, SharedState,
        question_bank::{QuestionBank, default_questions},
    },
};

pub const TIMEOUT: Duration = Duration::from_secs(5);

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Serve the full router with `config` and the built-in questions.
pub async fn boot_server(config: AppConfig) -> (SocketAddr, SharedState) {
    let state = AppState::new(config, QuestionBank::new(default_questions()));
    let app = build_router(state.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

/// Round settings that finish within a test's patience.
pub fn short_round(ticks: u32, tick_ms: u64, grace_ms: u64) -> AppConfig {
    AppConfig {
        round_duration_secs: ticks,
        tick_interval: Duration::from_millis(tick_ms),
        answer_grace: Duration::from_millis(grace_ms),
        ..AppConfig::default()
    }
}

/// One player connection.
pub struct Player {
    ws: WsStream,
}

impl Player {
    pub async fn connect(addr: SocketAddr) -> Self {
        let (ws, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
        Self { ws }
    }

    pub async fn send(&mut self, value: Value) {
        self.ws
            .send(Message::text(value.to_string()))
            .await
            .unwrap();
    }

    pub async fn send_raw(&mut self, raw: &str) {
        self.ws.send(Message::text(raw.to_owned())).await.unwrap();
    }

    /// Next JSON message of any kind.
    pub async fn recv(&mut self) -> Value {
        loop {
            let frame = timeout(TIMEOUT, self.ws.next())
                .await
                .expect("timed out waiting for a message")
                .expect("connection closed")
                .unwrap();
            if let Message::Text(text) = frame {
                return serde_json::from_str(text.as_str()).unwrap();
            }
        }
    }

    /// Next message that is not a leaderboard push.
    pub async fn recv_event(&mut self) -> Value {
        loop {
            let message = self.recv().await;
            if message["type"] != "leaderboard" {
                return message;
            }
        }
    }

    /// Wait for a leaderboard whose rows satisfy `accept`.
    pub async fn recv_leaderboard_where(&mut self, accept: impl Fn(&[Value]) -> bool) -> Vec<Value> {
        loop {
            let message = self.recv().await;
            if message["type"] != "leaderboard" {
                continue;
            }
            let rows = message["players"].as_array().cloned().unwrap_or_default();
            if accept(&rows) {
                return rows;
            }
        }
    }

    /// Assert nothing but leaderboard pushes arrives for `window`.
    pub async fn expect_quiet(&mut self, window: Duration) {
        let deadline = tokio::time::Instant::now() + window;
        loop {
            match tokio::time::timeout_at(deadline, self.ws.next()).await {
                Err(_) => return,
                Ok(Some(Ok(Message::Text(text)))) => {
                    let message: Value = serde_json::from_str(text.as_str()).unwrap();
                    assert_eq!(message["type"], "leaderboard", "unexpected message {message}");
                }
                Ok(Some(Ok(_))) => {}
                Ok(other) => panic!("connection ended: {other:?}"),
            }
        }
    }

    /// Register and start a round, returning the `game_started` acknowledgement.
    pub async fn join(&mut self, name: &str) -> Value {
        self.send(json!({"action": "register", "name": name})).await;
        let registered = self.recv_event().await;
        assert_eq!(registered["status"], "registered");
        self.send(json!({"action": "start_game"})).await;
        let started = self.recv_event().await;
        assert_eq!(started["status"], "game_started");
        started
    }

    /// Request a question and return its payload.
    pub async fn question(&mut self) -> Value {
        self.send(json!({"action": "get_question"})).await;
        let message = self.recv_event().await;
        assert_eq!(message["type"], "question", "{message}");
        message["q"].clone()
    }

    /// Answer with the advertised key (or a wrong label) and return the result.
    pub async fn answer(&mut self, question: &Value, correctly: bool) -> Value {
        let key = question["answer"].as_str().unwrap();
        let choice = if correctly {
            key
        } else if key == "A" {
            "B"
        } else {
            "A"
        };
        self.send(json!({"action": "answer", "answer": choice, "correct": key}))
            .await;
        let message = self.recv_event().await;
        assert_eq!(message["type"], "answer_result", "{message}");
        message
    }

    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }
}
