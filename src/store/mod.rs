//! Persistence
//!
//! Bets, legs and games live behind these traits. Every update is a single
//! record write; settlement writes only succeed while the record is pending.

mod memory;
mod types;

pub use memory::MemoryStore;
pub use types::{Game, GameStatus, StoreError};

use crate::wager::{Bet, BetEdit, BetId, BetLeg, BetStatus, ClvCategory, FutureLeg, LegId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Trait for game storage implementations
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Fetch the games with the given ids that exist
    async fn get_games(&self, ids: &[String]) -> Result<Vec<Game>, StoreError>;
    /// Games that have started and are not final, plus final games with
    /// unfinished settlement work
    async fn find_games_needing_resolution(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Game>, StoreError>;
    /// Scheduled games starting in `[from, to]`
    async fn find_games_starting_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Game>, StoreError>;
    /// Mark a game final with its score
    async fn record_final_score(
        &self,
        game_id: &str,
        home_score: u32,
        away_score: u32,
    ) -> Result<(), StoreError>;
}

/// Trait for bet storage implementations
#[async_trait]
pub trait BetStore: Send + Sync {
    /// Persist a bet with all of its legs atomically
    async fn insert_bet(&self, bet: Bet) -> Result<(), StoreError>;
    async fn get_bet(&self, id: BetId) -> Result<Option<Bet>, StoreError>;
    /// Bets owned by a user, newest first
    async fn list_bets(&self, user_id: &str) -> Result<Vec<Bet>, StoreError>;
    async fn get_leg(&self, id: LegId) -> Result<Option<BetLeg>, StoreError>;
    /// Pending legs referencing a game
    async fn find_pending_legs_for_game(&self, game_id: &str)
        -> Result<Vec<BetLeg>, StoreError>;
    /// Pending bets with at least one leg on a game
    async fn find_pending_bets_for_game(&self, game_id: &str) -> Result<Vec<Bet>, StoreError>;
    async fn find_future_leg(&self, id: Uuid) -> Result<Option<FutureLeg>, StoreError>;
    /// Set a pending leg's terminal status
    async fn update_leg_status(&self, id: LegId, status: BetStatus) -> Result<(), StoreError>;
    async fn update_leg_closing_odds(&self, id: LegId, odds: i32) -> Result<(), StoreError>;
    async fn update_leg_clv(
        &self,
        id: LegId,
        clv: Decimal,
        category: ClvCategory,
    ) -> Result<(), StoreError>;
    /// Set a pending future's terminal status
    async fn update_future_status(&self, id: Uuid, status: BetStatus) -> Result<(), StoreError>;
    /// Settle a pending bet
    async fn update_bet_settlement(
        &self,
        id: BetId,
        status: BetStatus,
        actual_payout: Decimal,
        settled_at: DateTime<Utc>,
    ) -> Result<Bet, StoreError>;
    /// Apply user edits to a pending bet
    async fn update_bet_details(
        &self,
        id: BetId,
        edit: BetEdit,
        potential_payout: Decimal,
    ) -> Result<Bet, StoreError>;
    async fn delete_bet(&self, id: BetId) -> Result<(), StoreError>;
}
