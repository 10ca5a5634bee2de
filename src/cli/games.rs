//! Game and odds snapshot loading

use super::ledger::odds_api_client;
use super::Ledger;
use crate::config::Config;
use crate::feed::OddsQuote;
use crate::odds::Sport;
use crate::store::Game;
use anyhow::Context;
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct SyncGamesArgs {
    /// Sport to fetch (nfl, ncaaf, nba, ncaab, mlb, nhl)
    #[arg(short, long)]
    pub sport: Sport,
}

impl SyncGamesArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let client = odds_api_client(&config.feed)?.with_context(|| {
            format!("Set {} to sync games", config.feed.api_key_env)
        })?;
        let games = client.fetch_events(self.sport).await?;

        let ledger = Ledger::open(config).await?;
        let mut added = 0;
        for game in games {
            // Never reset a game that has already moved past scheduled
            if ledger.store.game(&game.id).await.is_some() {
                continue;
            }
            ledger.store.upsert_game(game).await;
            added += 1;
        }
        ledger.save().await?;

        println!("Synced {} new {} games", added, self.sport);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// JSON array of games
    #[arg(long)]
    pub games: Option<PathBuf>,

    /// JSON array of odds quotes
    #[arg(long)]
    pub quotes: Option<PathBuf>,
}

impl ImportArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let ledger = Ledger::open(config).await?;

        if let Some(ref path) = self.games {
            let games: Vec<Game> = read_json(path).await?;
            let count = games.len();
            for game in games {
                ledger.store.upsert_game(game).await;
            }
            println!("Imported {} games", count);
        }

        if let Some(ref path) = self.quotes {
            let quotes: Vec<OddsQuote> = read_json(path).await?;
            let count = quotes.len();
            for quote in quotes {
                ledger.store.record_quote(quote).await;
            }
            println!("Imported {} quotes", count);
        }

        ledger.save().await
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid JSON in {}", path.display()))
}
