//! End-to-end player sessions over a real WebSocket connection.

mod common;

use std::time::Duration;

use serde_json::json;
use sprint_quiz_back::config::AppConfig;

use common::{Player, boot_server, short_round};

#[tokio::test]
async fn full_round_trip_scores_on_the_server() {
    let (addr, _state) = boot_server(AppConfig::default()).await;
    let mut alice = Player::connect(addr).await;

    alice
        .send(json!({"action": "register", "name": "Alice"}))
        .await;
    let registered = alice.recv_event().await;
    assert_eq!(registered["name"], "Alice");
    assert_eq!(registered["total_questions"], 8);

    alice.send(json!({"action": "start_game"})).await;
    assert_eq!(alice.recv_event().await["time_left"], 60);

    let first = alice.question().await;
    let result = alice.answer(&first, true).await;
    assert_eq!(result["result"], "correct");
    assert_eq!(result["score"], 1);

    let second = alice.question().await;
    assert_ne!(second["id"], first["id"]);
    let result = alice.answer(&second, false).await;
    assert_eq!(result["result"], "wrong");
    assert_eq!(result["score"], 1);

    alice.send(json!({"action": "get_leaderboard"})).await;
    let rows = alice
        .recv_leaderboard_where(|rows| rows.len() == 1 && rows[0]["score"] == 1)
        .await;
    assert_eq!(rows[0]["name"], "Alice");
}

#[tokio::test]
async fn forged_correct_field_does_not_award_points() {
    let (addr, _state) = boot_server(AppConfig::default()).await;
    let mut mallory = Player::connect(addr).await;
    mallory.join("Mallory").await;

    let question = mallory.question().await;
    let key = question["answer"].as_str().unwrap();
    let wrong = if key == "A" { "B" } else { "A" };
    mallory
        .send(json!({"action": "answer", "answer": wrong, "correct": wrong}))
        .await;
    let result = mallory.recv_event().await;
    assert_eq!(result["result"], "wrong");
    assert_eq!(result["score"], 0);
}

#[tokio::test]
async fn second_question_request_while_pending_is_ignored() {
    let (addr, _state) = boot_server(AppConfig::default()).await;
    let mut alice = Player::connect(addr).await;
    alice.join("Alice").await;

    let question = alice.question().await;
    alice.send(json!({"action": "get_question"})).await;
    alice.expect_quiet(Duration::from_millis(200)).await;

    // The original question is still the one being scored.
    let result = alice.answer(&question, true).await;
    assert_eq!(result["score"], 1);
}

#[tokio::test]
async fn bad_input_is_reported_without_closing_the_connection() {
    let (addr, _state) = boot_server(AppConfig::default()).await;
    let mut alice = Player::connect(addr).await;

    alice.send(json!({"action": "register", "name": "  "})).await;
    assert_eq!(alice.recv_event().await["code"], "invalid_name");

    alice.send_raw("definitely not json").await;
    assert_eq!(alice.recv_event().await["code"], "malformed_message");

    alice.send(json!({"action": "moonwalk"})).await;
    alice.expect_quiet(Duration::from_millis(200)).await;

    let started = alice.join("Alice").await;
    assert_eq!(started["time_left"], 60);
}

#[tokio::test]
async fn leaderboard_orders_by_score_then_registration() {
    let (addr, _state) = boot_server(AppConfig::default()).await;
    let mut bob = Player::connect(addr).await;
    bob.join("Bob").await;
    let mut alice = Player::connect(addr).await;
    alice.join("Alice").await;

    let q = bob.question().await;
    bob.answer(&q, true).await;
    let q = alice.question().await;
    alice.answer(&q, true).await;

    // Tied on one point: Bob registered first.
    let rows = alice
        .recv_leaderboard_where(|rows| rows.len() == 2 && rows.iter().all(|r| r["score"] == 1))
        .await;
    assert_eq!(rows[0]["name"], "Bob");
    assert_eq!(rows[1]["name"], "Alice");

    let q = alice.question().await;
    alice.answer(&q, true).await;
    let rows = bob
        .recv_leaderboard_where(|rows| rows.len() == 2 && rows[0]["score"] == 2)
        .await;
    assert_eq!(rows[0]["name"], "Alice");
    assert_eq!(rows[1]["name"], "Bob");
}

#[tokio::test]
async fn disconnect_removes_the_player_from_the_leaderboard() {
    let (addr, state) = boot_server(AppConfig::default()).await;
    let mut bob = Player::connect(addr).await;
    bob.join("Bob").await;
    let mut alice = Player::connect(addr).await;
    alice.join("Alice").await;
    assert_eq!(state.registry().len(), 2);
    bob.recv_leaderboard_where(|rows| rows.len() == 2).await;

    alice.close().await;
    let rows = bob.recv_leaderboard_where(|rows| rows.len() == 1).await;
    assert_eq!(rows[0]["name"], "Bob");
    assert_eq!(state.registry().len(), 1);
}

#[tokio::test]
async fn server_countdown_ends_the_round() {
    let (addr, _state) = boot_server(short_round(3, 50, 1_000)).await;
    let mut alice = Player::connect(addr).await;
    let started = alice.join("Alice").await;
    assert_eq!(started["time_left"], 3);

    let over = alice.recv_event().await;
    assert_eq!(over["type"], "game_over");
    assert_eq!(over["final_score"], 0);
    assert_eq!(over["time"], 3);

    // Ended is terminal.
    alice.send(json!({"action": "start_game"})).await;
    alice.send(json!({"action": "get_question"})).await;
    alice.expect_quiet(Duration::from_millis(200)).await;
}

#[tokio::test]
async fn answer_in_flight_at_expiry_is_scored_once_before_game_over() {
    let (addr, _state) = boot_server(short_round(1, 200, 5_000)).await;
    let mut alice = Player::connect(addr).await;
    alice.join("Alice").await;
    let question = alice.question().await;

    // Let the round expire while the question is still outstanding.
    tokio::time::sleep(Duration::from_millis(500)).await;
    let result = alice.answer(&question, true).await;
    assert_eq!(result["result"], "correct");
    assert_eq!(result["score"], 1);
    assert_eq!(result["time_left"], 0);

    let over = alice.recv_event().await;
    assert_eq!(over["type"], "game_over");
    assert_eq!(over["final_score"], 1);
}

#[tokio::test]
async fn unanswered_question_is_dropped_when_grace_lapses() {
    let (addr, _state) = boot_server(short_round(1, 200, 200)).await;
    let mut alice = Player::connect(addr).await;
    alice.join("Alice").await;
    let question = alice.question().await;

    let over = alice.recv_event().await;
    assert_eq!(over["type"], "game_over");
    assert_eq!(over["final_score"], 0);

    alice
        .send(json!({"action": "answer", "answer": question["answer"]}))
        .await;
    alice.expect_quiet(Duration::from_millis(200)).await;
}

#[tokio::test]
async fn client_time_up_ends_the_round_first() {
    let (addr, _state) = boot_server(AppConfig::default()).await;
    let mut alice = Player::connect(addr).await;
    alice.join("Alice").await;
    let q = alice.question().await;
    alice.answer(&q, true).await;

    alice.send(json!({"action": "time_up"})).await;
    let over = alice.recv_event().await;
    assert_eq!(over["type"], "game_over");
    assert_eq!(over["final_score"], 1);
    assert_eq!(over["time"], 60);

    // A second end trigger is a no-op.
    alice.send(json!({"action": "time_up"})).await;
    alice.expect_quiet(Duration::from_millis(200)).await;
}

#[tokio::test]
async fn leaderboard_after_game_over_still_lists_final_scores() {
    let (addr, _state) = boot_server(short_round(5, 100, 1_000)).await;
    let mut bob = Player::connect(addr).await;
    bob.join("Bob").await;
    let mut alice = Player::connect(addr).await;
    alice.join("Alice").await;

    let q = alice.question().await;
    alice.answer(&q, true).await;
    assert_eq!(alice.recv_event().await["type"], "game_over");
    assert_eq!(bob.recv_event().await["type"], "game_over");

    alice.send(json!({"action": "get_leaderboard"})).await;
    let rows = alice
        .recv_leaderboard_where(|rows| rows.len() == 2 && rows[0]["score"] == 1)
        .await;
    assert_eq!(rows[0]["name"], "Alice");
    assert_eq!(rows[1]["name"], "Bob");
    assert_eq!(rows[1]["score"], 0);
}
