/// OpenAPI documentation generation.
pub mod documentation;
/// Per-connection action dispatch and event emission.
pub mod gateway;
/// Leaderboard projections and SSE streaming.
pub mod leaderboard_service;
/// Question bank loading with built-in fallback.
pub mod question_service;
/// Cancellable countdown and delayed-signal tasks.
pub mod round_timer;
/// Landing, statistics and health payloads.
pub mod status_service;
/// WebSocket connection lifecycle.
pub mod websocket_service;
