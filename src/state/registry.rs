//! Process-wide registry of player scores, the source of every leaderboard snapshot.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU32, AtomicU64, Ordering},
    },
};

use dashmap::DashMap;
use uuid::Uuid;

/// Opaque per-connection player identity.
///
/// Two connections using the same display name get distinct identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerId(Uuid);

impl PlayerId {
    /// Allocate a fresh identity for a new connection.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Shared score record of one registered session.
///
/// The owning session is the only writer; snapshots read it concurrently.
#[derive(Debug)]
pub struct ScoreCard {
    name: String,
    registered_seq: u64,
    score: AtomicU32,
}

impl ScoreCard {
    /// Display name the player registered with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position in registration order, used as the leaderboard tie-breaker.
    pub fn registered_seq(&self) -> u64 {
        self.registered_seq
    }

    /// Current score.
    pub fn score(&self) -> u32 {
        self.score.load(Ordering::Acquire)
    }

    /// Add `points` and return the new total.
    pub(crate) fn award(&self, points: u32) -> u32 {
        let previous = self
            .score
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |score| {
                Some(score.saturating_add(points))
            })
            .unwrap_or_else(|score| score);
        previous.saturating_add(points)
    }

    /// Zero the score at the start of a round.
    pub(crate) fn reset(&self) {
        self.score.store(0, Ordering::Release);
    }
}

/// One ranked row of a leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    /// Display name of the player.
    pub name: String,
    /// Score at the time the snapshot was taken.
    pub score: u32,
}

/// Registry of every registered session, keyed by connection identity.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    cards: Arc<DashMap<PlayerId, Arc<ScoreCard>>>,
    next_seq: Arc<AtomicU64>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite the entry for `id`, returning the card the session writes to.
    pub fn register(&self, id: PlayerId, name: impl Into<String>) -> Arc<ScoreCard> {
        let card = Arc::new(ScoreCard {
            name: name.into(),
            registered_seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            score: AtomicU32::new(0),
        });
        self.cards.insert(id, card.clone());
        card
    }

    /// Drop the entry for `id`; only called once its connection is gone.
    pub fn remove(&self, id: &PlayerId) -> bool {
        self.cards.remove(id).is_some()
    }

    /// Look up the card registered for `id`.
    pub fn get(&self, id: &PlayerId) -> Option<Arc<ScoreCard>> {
        self.cards.get(id).map(|entry| entry.value().clone())
    }

    /// Number of registered players.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether nobody is registered.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Ranked view of every entry: descending score, then registration order.
    pub fn snapshot(&self) -> Vec<LeaderboardEntry> {
        self.ranked(None)
    }

    /// Same ordering as [`Self::snapshot`], truncated to the first `limit` rows.
    pub fn top(&self, limit: usize) -> Vec<LeaderboardEntry> {
        self.ranked(Some(limit))
    }

    fn ranked(&self, limit: Option<usize>) -> Vec<LeaderboardEntry> {
        // Each card is read once so a row's score cannot change while sorting.
        let mut rows: Vec<(u32, u64, String)> = self
            .cards
            .iter()
            .map(|entry| {
                let card = entry.value();
                (card.score(), card.registered_seq, card.name.clone())
            })
            .collect();

        rows.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        if let Some(limit) = limit {
            rows.truncate(limit);
        }

        rows.into_iter()
            .map(|(score, _, name)| LeaderboardEntry { name, score })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, score: u32) -> LeaderboardEntry {
        LeaderboardEntry {
            name: name.into(),
            score,
        }
    }

    #[test]
    fn ties_keep_registration_order() {
        let registry = SessionRegistry::new();
        let a = registry.register(PlayerId::new(), "A");
        let b = registry.register(PlayerId::new(), "B");
        let c = registry.register(PlayerId::new(), "C");
        c.award(5);
        b.award(10);
        a.award(10);

        assert_eq!(
            registry.snapshot(),
            vec![entry("A", 10), entry("B", 10), entry("C", 5)]
        );
    }

    #[test]
    fn higher_score_ranks_first() {
        let registry = SessionRegistry::new();
        registry.register(PlayerId::new(), "Alice").award(30);
        registry.register(PlayerId::new(), "Bob").award(45);

        assert_eq!(
            registry.snapshot(),
            vec![entry("Bob", 45), entry("Alice", 30)]
        );
    }

    #[test]
    fn same_name_on_two_connections_is_two_entries() {
        let registry = SessionRegistry::new();
        registry.register(PlayerId::new(), "Sam").award(2);
        registry.register(PlayerId::new(), "Sam").award(1);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.snapshot(), vec![entry("Sam", 2), entry("Sam", 1)]);
    }

    #[test]
    fn award_saturates_instead_of_wrapping() {
        let registry = SessionRegistry::new();
        let card = registry.register(PlayerId::new(), "Max");
        card.award(u32::MAX - 1);
        assert_eq!(card.award(5), u32::MAX);
        assert_eq!(card.score(), u32::MAX);
    }

    #[test]
    fn register_overwrites_the_same_identity() {
        let registry = SessionRegistry::new();
        let id = PlayerId::new();
        registry.register(id, "old").award(3);
        registry.register(id, "new");

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.snapshot(), vec![entry("new", 0)]);
    }

    #[test]
    fn removed_entries_leave_the_snapshot() {
        let registry = SessionRegistry::new();
        let id = PlayerId::new();
        registry.register(id, "gone").award(9);
        registry.register(PlayerId::new(), "stays");

        assert!(registry.remove(&id));
        assert!(!registry.remove(&id));
        assert_eq!(registry.snapshot(), vec![entry("stays", 0)]);
    }

    #[test]
    fn top_truncates_after_ranking() {
        let registry = SessionRegistry::new();
        for (name, score) in [("a", 1), ("b", 4), ("c", 3), ("d", 2)] {
            registry.register(PlayerId::new(), name).award(score);
        }
        assert_eq!(registry.top(2), vec![entry("b", 4), entry("c", 3)]);
    }

    #[tokio::test]
    async fn snapshots_interleave_with_concurrent_registration() {
        let registry = SessionRegistry::new();
        let writers: Vec<_> = (0..8)
            .map(|n| {
                let registry = registry.clone();
                tokio::spawn(async move {
                    for i in 0..50 {
                        let card = registry.register(PlayerId::new(), format!("p{n}-{i}"));
                        card.award(i);
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        for _ in 0..20 {
            let snapshot = registry.snapshot();
            assert!(snapshot.windows(2).all(|w| w[0].score >= w[1].score));
            tokio::task::yield_now().await;
        }
        for writer in writers {
            writer.await.unwrap();
        }
        assert_eq!(registry.len(), 400);
    }
}
