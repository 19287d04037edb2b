use std::sync::Arc;

use tokio::sync::broadcast;

use crate::state::registry::LeaderboardEntry;

/// Ranked rows shared by every subscriber of one update.
pub type LeaderboardUpdate = Arc<Vec<LeaderboardEntry>>;

/// Broadcast hub fanning leaderboard updates out to players and SSE streams.
pub struct LeaderboardHub {
    sender: broadcast::Sender<LeaderboardUpdate>,
}

impl LeaderboardHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent updates.
    pub fn subscribe(&self) -> broadcast::Receiver<LeaderboardUpdate> {
        self.sender.subscribe()
    }

    /// Send an update to all current subscribers, ignoring the no-subscriber case.
    pub fn broadcast(&self, rows: Vec<LeaderboardEntry>) {
        let _ = self.sender.send(Arc::new(rows));
    }
}
