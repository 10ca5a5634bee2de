//! Settlement orchestrator
//!
//! Ties the stores, feeds and engines together:
//! 1. Placing, editing and cancelling bets
//! 2. Periodic settlement of finished games
//! 3. Operator overrides for bets and futures
//! 4. Closing line capture and CLV reporting
//!
//! Batch passes never fail as a whole; per-game and per-bet failures are
//! collected in their summary.

mod run_state;
mod types;

pub use run_state::RunState;
pub use types::{BatchError, BatchScope, CaptureSummary, ResolutionSummary};

use crate::clv::{ClosingLineTracker, ClvError, ClvFilters, ClvReport};
use crate::config::{ClvConfig, SettlementConfig};
use crate::feed::{OddsSnapshotSource, ScoreProvider};
use crate::settlement::{default_payout, determine_bet_outcome, determine_leg_outcome};
use crate::store::{BetStore, Game, GameStore, StoreError};
use crate::telemetry::{increment_counter, CounterMetric};
use crate::wager::{
    price_bet, validate_shape, Bet, BetBuilder, BetEdit, BetId, BetStats, BetStatus,
    CreateBetInput, LegId, WagerError,
};
use chrono::{DateTime, Duration, Utc};
use futures_util::future::join_all;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

/// Entry point for every ledger operation
pub struct Orchestrator {
    bets: Arc<dyn BetStore>,
    games: Arc<dyn GameStore>,
    scores: Arc<dyn ScoreProvider>,
    tracker: ClosingLineTracker,
    config: SettlementConfig,
}

impl Orchestrator {
    /// Create a new orchestrator
    pub fn new(
        bets: Arc<dyn BetStore>,
        games: Arc<dyn GameStore>,
        scores: Arc<dyn ScoreProvider>,
        snapshots: Arc<dyn OddsSnapshotSource>,
        config: SettlementConfig,
        clv: ClvConfig,
    ) -> Self {
        let tracker =
            ClosingLineTracker::new(Arc::clone(&bets), Arc::clone(&games), snapshots, clv);
        Self {
            bets,
            games,
            scores,
            tracker,
            config,
        }
    }

    /// Validate, price and persist a new bet
    pub async fn create_bet(
        &self,
        input: CreateBetInput,
        now: DateTime<Utc>,
    ) -> Result<Bet, WagerError> {
        validate_shape(&input)?;

        let ids: Vec<String> = input
            .legs
            .iter()
            .map(|l| l.game_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let games = self.games.get_games(&ids).await?;

        let bet = BetBuilder::new(&games, now).build(input)?;
        self.bets.insert_bet(bet.clone()).await?;

        tracing::info!(
            bet_id = %bet.id,
            user_id = %bet.user_id,
            bet_type = %bet.bet_type,
            stake = %bet.stake,
            odds = bet.odds,
            potential_payout = %bet.potential_payout,
            "Bet placed"
        );
        Ok(bet)
    }

    /// Edit a pending bet before any of its games start
    ///
    /// A stake change re-prices the potential payout at the placed odds.
    pub async fn update_bet(
        &self,
        bet_id: BetId,
        edit: BetEdit,
        now: DateTime<Utc>,
    ) -> Result<Bet, WagerError> {
        let bet = self.editable_bet(bet_id, now).await?;

        let potential_payout = match edit.stake {
            Some(stake) if stake <= Decimal::ZERO => {
                return Err(WagerError::NonPositiveStake(stake));
            }
            Some(stake) => {
                let teaser = bet.teaser_sport.zip(bet.teaser_points);
                price_bet(bet.bet_type, stake, &bet.selection_odds(), teaser)?.1
            }
            None => bet.potential_payout,
        };

        let updated = self
            .bets
            .update_bet_details(bet_id, edit, potential_payout)
            .await
            .map_err(wager_error)?;
        tracing::info!(bet_id = %bet_id, stake = %updated.stake, "Bet updated");
        Ok(updated)
    }

    /// Remove a pending bet before any of its games start
    pub async fn cancel_bet(&self, bet_id: BetId, now: DateTime<Utc>) -> Result<(), WagerError> {
        self.editable_bet(bet_id, now).await?;
        self.bets.delete_bet(bet_id).await.map_err(wager_error)?;
        tracing::info!(bet_id = %bet_id, "Bet cancelled");
        Ok(())
    }

    /// A user's bets, newest first, optionally filtered by status
    pub async fn list_bets(
        &self,
        user_id: &str,
        status: Option<BetStatus>,
    ) -> Result<Vec<Bet>, WagerError> {
        let bets = self.bets.list_bets(user_id).await?;
        Ok(bets
            .into_iter()
            .filter(|b| status.map_or(true, |s| b.status == s))
            .collect())
    }

    /// Betting record for a user
    pub async fn bet_stats(&self, user_id: &str) -> Result<BetStats, WagerError> {
        let bets = self.bets.list_bets(user_id).await?;
        Ok(BetStats::from_bets(&bets))
    }

    /// Settle every pending leg of every finished game, then every bet
    /// whose selections are all terminal
    ///
    /// Safe to re-run: settled legs and bets are never touched again.
    pub async fn resolve_outcomes(&self, now: DateTime<Utc>) -> ResolutionSummary {
        let mut summary = ResolutionSummary::default();

        let games = match self.games.find_games_needing_resolution(now).await {
            Ok(games) => games,
            Err(e) => {
                tracing::error!(error = %e, "Failed to list games needing resolution");
                summary
                    .errors
                    .push(BatchError::new(BatchScope::Query, "games", e));
                increment_counter(CounterMetric::SettlementErrors, 1);
                return summary;
            }
        };
        summary.games_checked = games.len();

        let scores = join_all(games.iter().map(|g| self.final_score(g))).await;

        for (game, score) in games.iter().zip(scores) {
            match score {
                Ok(Some((home, away))) => {
                    if game.final_score().is_none() {
                        if let Err(e) = self.games.record_final_score(&game.id, home, away).await
                        {
                            summary
                                .errors
                                .push(BatchError::new(BatchScope::Game, &game.id, e));
                            continue;
                        }
                        summary.games_updated += 1;
                    }
                    self.settle_game(game, home, away, now, &mut summary).await;
                }
                Ok(None) => {
                    tracing::debug!(game_id = %game.id, "Game not finished yet");
                }
                Err(e) => {
                    tracing::warn!(game_id = %game.id, error = %e, "Score lookup failed");
                    summary
                        .errors
                        .push(BatchError::new(BatchScope::Game, &game.id, e));
                }
            }
        }

        increment_counter(CounterMetric::LegsSettled, summary.legs_settled as u64);
        increment_counter(CounterMetric::BetsSettled, summary.bets_settled as u64);
        increment_counter(CounterMetric::SettlementErrors, summary.errors.len() as u64);

        tracing::info!(
            games_checked = summary.games_checked,
            games_updated = summary.games_updated,
            legs_settled = summary.legs_settled,
            bets_settled = summary.bets_settled,
            errors = summary.errors.len(),
            "Settlement pass complete"
        );
        summary
    }

    /// Run a settlement pass unless one is already marked running
    pub async fn run_tracked(
        &self,
        state: &mut RunState,
        now: DateTime<Utc>,
    ) -> Option<ResolutionSummary> {
        if !state.try_start(now) {
            tracing::warn!(
                started_at = ?state.last_started_at,
                "Settlement pass already running, skipping"
            );
            return None;
        }

        let summary = self.resolve_outcomes(now).await;
        state.finish(Utc::now(), summary.clone());
        Some(summary)
    }

    /// Operator settlement of a pending bet
    ///
    /// Without an explicit payout: won pays the potential payout, push
    /// returns the stake, lost pays nothing.
    pub async fn settle_bet_manually(
        &self,
        bet_id: BetId,
        status: BetStatus,
        actual_payout: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> Result<Bet, WagerError> {
        if !status.is_terminal() {
            return Err(WagerError::InvalidSettlementStatus(status));
        }

        let bet = self
            .bets
            .get_bet(bet_id)
            .await?
            .ok_or(WagerError::BetNotFound(bet_id))?;
        if !bet.is_pending() {
            return Err(WagerError::AlreadySettled(bet_id));
        }

        let payout = actual_payout.unwrap_or_else(|| default_payout(&bet, status));
        let settled = self
            .bets
            .update_bet_settlement(bet_id, status, payout, now)
            .await
            .map_err(wager_error)?;

        increment_counter(CounterMetric::BetsSettled, 1);
        tracing::info!(
            bet_id = %bet_id,
            status = %status,
            payout = %payout,
            "Bet settled manually"
        );
        Ok(settled)
    }

    /// Operator settlement of a futures selection
    ///
    /// Returns the parent bet if this settled it.
    pub async fn settle_future_leg(
        &self,
        future_id: Uuid,
        status: BetStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Bet>, WagerError> {
        if !status.is_terminal() {
            return Err(WagerError::InvalidSettlementStatus(status));
        }

        let future = self
            .bets
            .find_future_leg(future_id)
            .await?
            .ok_or(WagerError::FutureLegNotFound(future_id))?;

        match self.bets.update_future_status(future_id, status).await {
            Ok(()) => {}
            Err(StoreError::AlreadySettled(_)) => {
                return Err(WagerError::AlreadySettled(future.bet_id));
            }
            Err(e) => return Err(e.into()),
        }
        tracing::info!(future_id = %future_id, status = %status, "Future leg settled");

        let settled = self.finalize_bet(future.bet_id, now).await?;
        if settled.is_some() {
            increment_counter(CounterMetric::BetsSettled, 1);
        }
        Ok(settled)
    }

    /// Capture closing odds for games about to start, then score each
    /// captured leg
    pub async fn capture_due_closing_lines(&self, now: DateTime<Utc>) -> CaptureSummary {
        let mut summary = CaptureSummary::default();
        let horizon = now + Duration::minutes(self.config.closing_line_horizon_minutes);

        let games = match self.games.find_games_starting_between(now, horizon).await {
            Ok(games) => games,
            Err(e) => {
                summary
                    .errors
                    .push(BatchError::new(BatchScope::Query, "games", e));
                return summary;
            }
        };
        summary.games_checked = games.len();

        for game in &games {
            let outcome = match self.tracker.capture_closing_line(&game.id).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!(game_id = %game.id, error = %e, "Closing line capture failed");
                    summary
                        .errors
                        .push(BatchError::new(BatchScope::Capture, &game.id, e));
                    continue;
                }
            };
            summary.legs_captured += outcome.captured.len();
            summary.legs_unmatched += outcome.unmatched.len();
            for (leg_id, message) in outcome.failed {
                summary
                    .errors
                    .push(BatchError::new(BatchScope::Capture, leg_id, message));
            }

            for leg_id in outcome.captured.into_iter().chain(outcome.awaiting_clv) {
                match self.tracker.calculate_clv(leg_id).await {
                    Ok(Some(_)) => summary.clv_calculated += 1,
                    Ok(None) => {}
                    Err(e) => summary
                        .errors
                        .push(BatchError::new(BatchScope::Leg, leg_id, e)),
                }
            }
        }

        increment_counter(
            CounterMetric::ClosingLinesCaptured,
            summary.legs_captured as u64,
        );
        tracing::info!(
            games_checked = summary.games_checked,
            legs_captured = summary.legs_captured,
            legs_unmatched = summary.legs_unmatched,
            errors = summary.errors.len(),
            "Closing line pass complete"
        );
        summary
    }

    /// Compute and store one leg's CLV
    pub async fn calculate_clv(&self, leg_id: LegId) -> Result<Option<Decimal>, ClvError> {
        self.tracker.calculate_clv(leg_id).await
    }

    /// CLV report for a user
    pub async fn generate_clv_report(
        &self,
        user_id: &str,
        filters: &ClvFilters,
    ) -> Result<ClvReport, ClvError> {
        self.tracker.generate_report(user_id, filters).await
    }

    /// Final score from storage, else from the score provider once completed
    async fn final_score(&self, game: &Game) -> anyhow::Result<Option<(u32, u32)>> {
        if let Some(score) = game.final_score() {
            return Ok(Some(score));
        }
        let result = self.scores.fetch_final_score(game).await?;
        Ok(result
            .completed
            .then_some((result.home_score, result.away_score)))
    }

    /// Settle a finished game's pending legs, then finalize its bets
    ///
    /// Leg writes for the game finish before any bet is checked.
    async fn settle_game(
        &self,
        game: &Game,
        home: u32,
        away: u32,
        now: DateTime<Utc>,
        summary: &mut ResolutionSummary,
    ) {
        let legs = match self.bets.find_pending_legs_for_game(&game.id).await {
            Ok(legs) => legs,
            Err(e) => {
                summary
                    .errors
                    .push(BatchError::new(BatchScope::Game, &game.id, e));
                return;
            }
        };

        for leg in &legs {
            let status = match determine_leg_outcome(leg, home, away) {
                Ok(status) => status,
                Err(e) => {
                    tracing::warn!(leg_id = %leg.id, error = %e, "Leg cannot be settled");
                    summary
                        .errors
                        .push(BatchError::new(BatchScope::Leg, leg.id, e));
                    continue;
                }
            };
            match self.bets.update_leg_status(leg.id, status).await {
                Ok(()) => {
                    summary.legs_settled += 1;
                    tracing::debug!(leg_id = %leg.id, status = %status, "Leg settled");
                }
                Err(StoreError::AlreadySettled(_)) => {}
                Err(e) => summary
                    .errors
                    .push(BatchError::new(BatchScope::Leg, leg.id, e)),
            }
        }

        let bets = match self.bets.find_pending_bets_for_game(&game.id).await {
            Ok(bets) => bets,
            Err(e) => {
                summary
                    .errors
                    .push(BatchError::new(BatchScope::Game, &game.id, e));
                return;
            }
        };
        for bet in bets {
            match self.finalize_bet(bet.id, now).await {
                Ok(Some(_)) => summary.bets_settled += 1,
                Ok(None) => {}
                Err(e) => summary
                    .errors
                    .push(BatchError::new(BatchScope::Bet, bet.id, e)),
            }
        }
    }

    /// Settle a pending bet once all its selections are terminal
    async fn finalize_bet(
        &self,
        bet_id: BetId,
        now: DateTime<Utc>,
    ) -> Result<Option<Bet>, WagerError> {
        let bet = self
            .bets
            .get_bet(bet_id)
            .await?
            .ok_or(WagerError::BetNotFound(bet_id))?;
        if !bet.is_pending() {
            return Ok(None);
        }

        let Some(outcome) = determine_bet_outcome(&bet)? else {
            return Ok(None);
        };

        match self
            .bets
            .update_bet_settlement(bet_id, outcome.status, outcome.actual_payout, now)
            .await
        {
            Ok(settled) => {
                tracing::info!(
                    bet_id = %bet_id,
                    status = %outcome.status,
                    payout = %outcome.actual_payout,
                    "Bet settled"
                );
                Ok(Some(settled))
            }
            Err(StoreError::AlreadySettled(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Load a bet that may still be edited or cancelled
    async fn editable_bet(&self, bet_id: BetId, now: DateTime<Utc>) -> Result<Bet, WagerError> {
        let bet = self
            .bets
            .get_bet(bet_id)
            .await?
            .ok_or(WagerError::BetNotFound(bet_id))?;
        if !bet.is_pending() {
            return Err(WagerError::AlreadySettled(bet_id));
        }

        let games = self.games.get_games(&bet.game_ids()).await?;
        if let Some(started) = games.iter().find(|g| g.has_started(now)) {
            return Err(WagerError::GameAlreadyStarted(started.id.clone()));
        }
        Ok(bet)
    }
}

/// Map store refusals onto the matching wager errors
fn wager_error(err: StoreError) -> WagerError {
    match err {
        StoreError::AlreadySettled(id) => WagerError::AlreadySettled(id),
        StoreError::BetNotFound(id) => WagerError::BetNotFound(id),
        StoreError::FutureLegNotFound(id) => WagerError::FutureLegNotFound(id),
        other => WagerError::Store(other),
    }
}
