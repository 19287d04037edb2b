//! Play rounds against a running quiz server with one or more headless players.

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::task::JoinSet;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sprint_quiz_back::client::bot::{self, BotConfig, Strategy};

/// headless players for the sprint quiz server
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
struct Cli {
    /// websocket endpoint of the server
    #[clap(short, long, default_value = "ws://127.0.0.1:8000/ws")]
    url: String,

    /// display name; numbered when several players run
    #[clap(short, long, default_value = "bot")]
    name: String,

    /// number of concurrent players
    #[clap(short, long, default_value_t = 1)]
    players: usize,

    /// how answers are chosen
    #[clap(short, long, value_enum, default_value_t = Strategy::Random)]
    strategy: Strategy,

    /// pause between feedback and the next question, in milliseconds
    #[clap(long, default_value_t = 800)]
    delay_ms: u64,
}

impl Cli {
    fn bot_config(&self, index: usize) -> BotConfig {
        let name = if self.players > 1 {
            format!("{}-{}", self.name, index + 1)
        } else {
            self.name.clone()
        };
        let mut config = BotConfig::new(self.url.clone(), name);
        config.strategy = self.strategy;
        config.next_question_delay = Duration::from_millis(self.delay_ms);
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    anyhow::ensure!(cli.players > 0, "at least one player is required");

    let mut bots = JoinSet::new();
    for index in 0..cli.players {
        bots.spawn(bot::run(cli.bot_config(index)));
    }

    let mut failures = 0;
    while let Some(joined) = bots.join_next().await {
        match joined.context("bot task panicked")? {
            Ok(report) => info!(
                name = %report.name,
                final_score = report.final_score,
                answered = report.answered,
                ended_by = ?report.ended_by,
                "round finished"
            ),
            Err(err) => {
                failures += 1;
                error!(error = %err, "bot failed");
            }
        }
    }

    anyhow::ensure!(failures == 0, "{failures} bot(s) failed");
    Ok(())
}
