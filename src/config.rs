//! Application-level configuration loading, including round timing and question source.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SPRINT_QUIZ_CONFIG_PATH";
/// Default question file, in the `ANSWER:` block format.
const DEFAULT_QUESTIONS_PATH: &str = "questions/raw_questions.txt";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Length of one round, in seconds.
    pub round_duration_secs: u32,
    /// Points awarded for each correct answer.
    pub points_per_correct: u32,
    /// Period of the per-session countdown.
    pub tick_interval: Duration,
    /// How long an answer to a question issued before expiry is still accepted.
    pub answer_grace: Duration,
    /// Number of entries pushed to players on every leaderboard update.
    pub leaderboard_size: usize,
    /// Path of the question file loaded at startup.
    pub questions_path: PathBuf,
    /// Whether `question` events carry the answer identifier.
    pub expose_answer_key: bool,
    /// Maximum accepted display name length, in characters.
    pub max_name_len: usize,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        round_secs = app_config.round_duration_secs,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    round_duration_secs: Option<u32>,
    points_per_correct: Option<u32>,
    tick_interval_ms: Option<u64>,
    answer_grace_ms: Option<u64>,
    leaderboard_size: Option<usize>,
    questions_path: Option<PathBuf>,
    expose_answer_key: Option<bool>,
    max_name_len: Option<usize>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            round_duration_secs: value.round_duration_secs.unwrap_or(60).max(1),
            points_per_correct: value.points_per_correct.unwrap_or(1),
            tick_interval: Duration::from_millis(value.tick_interval_ms.unwrap_or(1000).max(1)),
            answer_grace: Duration::from_millis(value.answer_grace_ms.unwrap_or(2000)),
            leaderboard_size: value.leaderboard_size.unwrap_or(10).max(1),
            questions_path: value
                .questions_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_QUESTIONS_PATH)),
            expose_answer_key: value.expose_answer_key.unwrap_or(true),
            max_name_len: value.max_name_len.unwrap_or(32).max(1),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_sixty_second_round() {
        let config = AppConfig::default();
        assert_eq!(config.round_duration_secs, 60);
        assert_eq!(config.points_per_correct, 1);
        assert_eq!(config.tick_interval, Duration::from_secs(1));
        assert_eq!(config.leaderboard_size, 10);
        assert!(config.expose_answer_key);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let raw: RawConfig =
            serde_json::from_str(r#"{ "round_duration_secs": 30, "answer_grace_ms": 500 }"#)
                .unwrap();
        let config = AppConfig::from(raw);
        assert_eq!(config.round_duration_secs, 30);
        assert_eq!(config.answer_grace, Duration::from_millis(500));
        assert_eq!(config.points_per_correct, 1);
        assert_eq!(
            config.questions_path,
            PathBuf::from("questions/raw_questions.txt")
        );
    }

    #[test]
    fn zero_durations_are_clamped() {
        let raw: RawConfig =
            serde_json::from_str(r#"{ "round_duration_secs": 0, "tick_interval_ms": 0 }"#)
                .unwrap();
        let config = AppConfig::from(raw);
        assert_eq!(config.round_duration_secs, 1);
        assert_eq!(config.tick_interval, Duration::from_millis(1));
    }
}
