//! Score and odds feeds
//!
//! Final scores and odds snapshots come from outside the ledger. Lookups may
//! fail transiently; callers record the failure and move on.

mod the_odds_api;

pub use the_odds_api::{
    parse_event_odds, parse_events, parse_scores, TheOddsApiClient, TheOddsApiConfig, ODDS_API_URL,
};

use crate::odds::{MarketType, Selection};
use crate::store::Game;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Score report for one game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub home_score: u32,
    pub away_score: u32,
    /// False while the game is still being played
    pub completed: bool,
}

/// A bookmaker's price for one side of a market at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsQuote {
    pub game_id: String,
    pub bookmaker: String,
    pub market: MarketType,
    pub selection: Selection,
    /// Home handicap for spreads, points for totals
    pub line: Option<Decimal>,
    /// American price, possibly fractional
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// Trait for final score lookups
#[async_trait]
pub trait ScoreProvider: Send + Sync {
    /// Fetch the latest score for a game
    async fn fetch_final_score(&self, game: &Game) -> anyhow::Result<GameResult>;
}

/// Trait for odds snapshot lookups
#[async_trait]
pub trait OddsSnapshotSource: Send + Sync {
    /// Quotes for one side of a market in a game
    async fn find_odds_snapshots(
        &self,
        game: &Game,
        market: MarketType,
        selection: Selection,
        line: Option<Decimal>,
    ) -> anyhow::Result<Vec<OddsQuote>>;
}
