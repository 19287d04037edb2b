pub mod leaderboard;
pub mod status;
pub mod validation;
pub mod ws;
