//! In-memory store with JSON file persistence

use super::{BetStore, Game, GameStatus, GameStore, StoreError};
use crate::feed::{OddsQuote, OddsSnapshotSource};
use crate::odds::{MarketType, Selection};
use crate::wager::{Bet, BetEdit, BetId, BetLeg, BetStatus, ClvCategory, FutureLeg, LegId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Everything the store holds, as written to disk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerState {
    #[serde(default)]
    pub games: HashMap<String, Game>,
    #[serde(default)]
    pub bets: HashMap<BetId, Bet>,
    #[serde(default)]
    pub quotes: Vec<OddsQuote>,
}

impl LedgerState {
    fn leg_mut(&mut self, id: LegId) -> Option<&mut BetLeg> {
        self.bets
            .values_mut()
            .flat_map(|b| b.legs.iter_mut())
            .find(|l| l.id == id)
    }

    fn future_mut(&mut self, id: Uuid) -> Option<&mut FutureLeg> {
        self.bets
            .values_mut()
            .flat_map(|b| b.futures.iter_mut())
            .find(|f| f.id == id)
    }

    /// A final game still has work when one of its legs is pending, or a
    /// pending bet on it is ready to finalize
    fn has_unsettled_work(&self, game_id: &str) -> bool {
        self.bets.values().any(|b| {
            let on_game = b.legs.iter().any(|l| l.game_id == game_id);
            let leg_pending = b
                .legs
                .iter()
                .any(|l| l.game_id == game_id && l.status == BetStatus::Pending);
            on_game && (leg_pending || (b.is_pending() && b.all_selections_terminal()))
        })
    }
}

/// Bet, game and odds-quote store backed by a `RwLock`
///
/// Each write takes the lock once, so conditional updates ("only while
/// pending") are atomic.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<LedgerState>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a JSON file, empty if the file does not exist
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "No ledger file, starting empty");
            return Ok(Self::new());
        }

        let json = tokio::fs::read_to_string(path).await?;
        let state: LedgerState = serde_json::from_str(&json)?;
        tracing::debug!(
            bets = state.bets.len(),
            games = state.games.len(),
            "Loaded ledger"
        );
        Ok(Self {
            state: Arc::new(RwLock::new(state)),
        })
    }

    /// Write the store to a JSON file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = {
            let state = self.state.read().await;
            serde_json::to_string_pretty(&*state)?
        };
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Insert or replace a game
    pub async fn upsert_game(&self, game: Game) {
        let mut state = self.state.write().await;
        state.games.insert(game.id.clone(), game);
    }

    /// Record an odds quote for closing-line matching
    pub async fn record_quote(&self, quote: OddsQuote) {
        let mut state = self.state.write().await;
        state.quotes.push(quote);
    }

    /// Look up one game
    pub async fn game(&self, id: &str) -> Option<Game> {
        self.state.read().await.games.get(id).cloned()
    }

    /// Number of bets still pending across all users
    pub async fn pending_bet_count(&self) -> usize {
        self.state
            .read()
            .await
            .bets
            .values()
            .filter(|b| b.is_pending())
            .count()
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn get_games(&self, ids: &[String]) -> Result<Vec<Game>, StoreError> {
        let state = self.state.read().await;
        Ok(ids.iter().filter_map(|id| state.games.get(id).cloned()).collect())
    }

    async fn find_games_needing_resolution(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Game>, StoreError> {
        let state = self.state.read().await;
        let mut games: Vec<Game> = state
            .games
            .values()
            .filter(|g| match g.status {
                GameStatus::Final => state.has_unsettled_work(&g.id),
                _ => g.start_time <= now,
            })
            .cloned()
            .collect();
        games.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
        Ok(games)
    }

    async fn find_games_starting_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Game>, StoreError> {
        let state = self.state.read().await;
        let mut games: Vec<Game> = state
            .games
            .values()
            .filter(|g| {
                g.status == GameStatus::Scheduled && g.start_time >= from && g.start_time <= to
            })
            .cloned()
            .collect();
        games.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
        Ok(games)
    }

    async fn record_final_score(
        &self,
        game_id: &str,
        home_score: u32,
        away_score: u32,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let game = state
            .games
            .get_mut(game_id)
            .ok_or_else(|| StoreError::GameNotFound(game_id.to_string()))?;
        game.status = GameStatus::Final;
        game.home_score = Some(home_score);
        game.away_score = Some(away_score);
        Ok(())
    }
}

#[async_trait]
impl BetStore for MemoryStore {
    async fn insert_bet(&self, bet: Bet) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.bets.insert(bet.id, bet);
        Ok(())
    }

    async fn get_bet(&self, id: BetId) -> Result<Option<Bet>, StoreError> {
        Ok(self.state.read().await.bets.get(&id).cloned())
    }

    async fn list_bets(&self, user_id: &str) -> Result<Vec<Bet>, StoreError> {
        let state = self.state.read().await;
        let mut bets: Vec<Bet> = state
            .bets
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        bets.sort_by(|a, b| b.placed_at.cmp(&a.placed_at));
        Ok(bets)
    }

    async fn get_leg(&self, id: LegId) -> Result<Option<BetLeg>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .bets
            .values()
            .flat_map(|b| b.legs.iter())
            .find(|l| l.id == id)
            .cloned())
    }

    async fn find_pending_legs_for_game(
        &self,
        game_id: &str,
    ) -> Result<Vec<BetLeg>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .bets
            .values()
            .flat_map(|b| b.legs.iter())
            .filter(|l| l.game_id == game_id && l.status == BetStatus::Pending)
            .cloned()
            .collect())
    }

    async fn find_pending_bets_for_game(&self, game_id: &str) -> Result<Vec<Bet>, StoreError> {
        let state = self.state.read().await;
        let mut bets: Vec<Bet> = state
            .bets
            .values()
            .filter(|b| b.is_pending() && b.legs.iter().any(|l| l.game_id == game_id))
            .cloned()
            .collect();
        bets.sort_by(|a, b| a.placed_at.cmp(&b.placed_at).then(a.id.cmp(&b.id)));
        Ok(bets)
    }

    async fn find_future_leg(&self, id: Uuid) -> Result<Option<FutureLeg>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .bets
            .values()
            .flat_map(|b| b.futures.iter())
            .find(|f| f.id == id)
            .cloned())
    }

    async fn update_leg_status(&self, id: LegId, status: BetStatus) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let leg = state.leg_mut(id).ok_or(StoreError::LegNotFound(id))?;
        if leg.status.is_terminal() {
            return Err(StoreError::AlreadySettled(id));
        }
        leg.status = status;
        Ok(())
    }

    async fn update_leg_closing_odds(&self, id: LegId, odds: i32) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let leg = state.leg_mut(id).ok_or(StoreError::LegNotFound(id))?;
        leg.closing_odds = Some(odds);
        Ok(())
    }

    async fn update_leg_clv(
        &self,
        id: LegId,
        clv: Decimal,
        category: ClvCategory,
    ) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let leg = state.leg_mut(id).ok_or(StoreError::LegNotFound(id))?;
        leg.clv = Some(clv);
        leg.clv_category = Some(category);
        Ok(())
    }

    async fn update_future_status(&self, id: Uuid, status: BetStatus) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let future = state
            .future_mut(id)
            .ok_or(StoreError::FutureLegNotFound(id))?;
        if future.status.is_terminal() {
            return Err(StoreError::AlreadySettled(id));
        }
        future.status = status;
        Ok(())
    }

    async fn update_bet_settlement(
        &self,
        id: BetId,
        status: BetStatus,
        actual_payout: Decimal,
        settled_at: DateTime<Utc>,
    ) -> Result<Bet, StoreError> {
        let mut state = self.state.write().await;
        let bet = state.bets.get_mut(&id).ok_or(StoreError::BetNotFound(id))?;
        if bet.status.is_terminal() {
            return Err(StoreError::AlreadySettled(id));
        }
        bet.status = status;
        bet.actual_payout = Some(actual_payout);
        bet.settled_at = Some(settled_at);
        Ok(bet.clone())
    }

    async fn update_bet_details(
        &self,
        id: BetId,
        edit: BetEdit,
        potential_payout: Decimal,
    ) -> Result<Bet, StoreError> {
        let mut state = self.state.write().await;
        let bet = state.bets.get_mut(&id).ok_or(StoreError::BetNotFound(id))?;
        if bet.status.is_terminal() {
            return Err(StoreError::AlreadySettled(id));
        }
        if let Some(name) = edit.name {
            bet.name = name;
        }
        if let Some(stake) = edit.stake {
            bet.stake = stake;
        }
        if let Some(notes) = edit.notes {
            bet.notes = Some(notes);
        }
        bet.potential_payout = potential_payout;
        Ok(bet.clone())
    }

    async fn delete_bet(&self, id: BetId) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state
            .bets
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::BetNotFound(id))
    }
}

#[async_trait]
impl OddsSnapshotSource for MemoryStore {
    async fn find_odds_snapshots(
        &self,
        game: &Game,
        market: MarketType,
        selection: Selection,
        _line: Option<Decimal>,
    ) -> anyhow::Result<Vec<OddsQuote>> {
        let state = self.state.read().await;
        Ok(state
            .quotes
            .iter()
            .filter(|q| q.game_id == game.id && q.market == market && q.selection == selection)
            .cloned()
            .collect())
    }
}
