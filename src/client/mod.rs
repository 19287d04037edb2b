//! Headless player client: a pure round mirror and a WebSocket driver built on it.

pub mod bot;
pub mod round;

pub use self::round::{ClientCommand, ClientPhase, ClientRound, RoundEndCause};
