//! Ledger wiring shared by the subcommands

use crate::config::{Config, FeedConfig};
use crate::feed::{
    GameResult, OddsSnapshotSource, ScoreProvider, TheOddsApiClient, TheOddsApiConfig,
};
use crate::orchestrator::Orchestrator;
use crate::store::{Game, MemoryStore};
use crate::telemetry::{set_gauge, GaugeMetric};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// The ledger file plus an orchestrator over it
pub struct Ledger {
    pub store: MemoryStore,
    pub orchestrator: Orchestrator,
    path: PathBuf,
}

impl Ledger {
    /// Load the ledger file and wire up feeds
    ///
    /// Without an API key, scores are unavailable and closing lines come
    /// from imported snapshots.
    pub async fn open(config: &Config) -> anyhow::Result<Self> {
        let store = MemoryStore::load(&config.store.path).await?;
        let shared = Arc::new(store.clone());

        let (scores, snapshots): (Arc<dyn ScoreProvider>, Arc<dyn OddsSnapshotSource>) =
            match odds_api_client(&config.feed)? {
                Some(client) => {
                    let client = Arc::new(client);
                    (client.clone(), client)
                }
                None => {
                    tracing::warn!(
                        env = %config.feed.api_key_env,
                        "No Odds API key, score lookups disabled"
                    );
                    let offline = Arc::new(NoScoreFeed {
                        api_key_env: config.feed.api_key_env.clone(),
                    });
                    (offline, shared.clone())
                }
            };

        let orchestrator = Orchestrator::new(
            shared.clone(),
            shared,
            scores,
            snapshots,
            config.settlement.clone(),
            config.clv.clone(),
        );

        Ok(Self {
            store,
            orchestrator,
            path: config.store.path.clone(),
        })
    }

    /// Write the ledger back to disk
    pub async fn save(&self) -> anyhow::Result<()> {
        self.store.save(&self.path).await?;
        set_gauge(
            GaugeMetric::PendingBets,
            self.store.pending_bet_count().await as f64,
        );
        tracing::debug!(path = %self.path.display(), "Ledger saved");
        Ok(())
    }
}

/// Build The Odds API client when its key is in the environment
pub fn odds_api_client(config: &FeedConfig) -> anyhow::Result<Option<TheOddsApiClient>> {
    let api_key = match std::env::var(&config.api_key_env) {
        Ok(key) if !key.trim().is_empty() => key,
        _ => return Ok(None),
    };

    let client = TheOddsApiClient::new(TheOddsApiConfig {
        base_url: config.base_url.clone(),
        api_key,
        regions: config.regions.clone(),
        timeout: Duration::from_secs(config.timeout_secs),
    })?;
    Ok(Some(client))
}

/// Score provider used when no API key is configured
struct NoScoreFeed {
    api_key_env: String,
}

#[async_trait]
impl ScoreProvider for NoScoreFeed {
    async fn fetch_final_score(&self, game: &Game) -> anyhow::Result<GameResult> {
        anyhow::bail!(
            "No score feed for game {}: set {} to enable The Odds API",
            game.id,
            self.api_key_env
        )
    }
}
