//! Closing line capture and per-leg CLV

use super::calculator::{calculate_clv, categorize_clv};
use super::report::{ClvEntry, ClvFilters, ClvReport};
use super::{CaptureOutcome, ClvError};
use crate::config::ClvConfig;
use crate::feed::{OddsQuote, OddsSnapshotSource};
use crate::odds::{MarketType, Selection};
use crate::store::{BetStore, GameStore, StoreError};
use crate::wager::{BetLeg, LegId};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;
use std::sync::Arc;

/// Records closing odds on pending legs and scores them against the price taken
pub struct ClosingLineTracker {
    bets: Arc<dyn BetStore>,
    games: Arc<dyn GameStore>,
    snapshots: Arc<dyn OddsSnapshotSource>,
    config: ClvConfig,
}

impl ClosingLineTracker {
    pub fn new(
        bets: Arc<dyn BetStore>,
        games: Arc<dyn GameStore>,
        snapshots: Arc<dyn OddsSnapshotSource>,
        config: ClvConfig,
    ) -> Self {
        Self {
            bets,
            games,
            snapshots,
            config,
        }
    }

    /// Capture closing odds for every pending leg of a game without them
    ///
    /// Legs with no matching snapshot are reported in `unmatched`. A failed
    /// lookup or write only affects the legs it covers; they are reported in
    /// `failed` and retried on the next pass.
    pub async fn capture_closing_line(&self, game_id: &str) -> Result<CaptureOutcome, ClvError> {
        let game = self
            .games
            .get_games(&[game_id.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::GameNotFound(game_id.to_string()))?;

        let mut outcome = CaptureOutcome {
            game_id: game_id.to_string(),
            ..Default::default()
        };

        let mut legs = Vec::new();
        for leg in self.bets.find_pending_legs_for_game(game_id).await? {
            match (leg.closing_odds, leg.clv) {
                (None, _) => legs.push(leg),
                (Some(_), None) => outcome.awaiting_clv.push(leg.id),
                (Some(_), Some(_)) => {}
            }
        }

        let mut quotes: HashMap<(MarketType, Selection), Result<Vec<OddsQuote>, String>> =
            HashMap::new();

        for leg in legs {
            let key = (leg.market, leg.selection);
            if !quotes.contains_key(&key) {
                let found = self
                    .snapshots
                    .find_odds_snapshots(&game, leg.market, leg.selection, leg.line)
                    .await
                    .map_err(|e| {
                        tracing::warn!(
                            game_id = %game_id,
                            market = ?leg.market,
                            error = %e,
                            "Snapshot lookup failed"
                        );
                        e.to_string()
                    });
                quotes.insert(key, found);
            }
            let candidates = match quotes.get(&key) {
                Some(Ok(found)) => found.as_slice(),
                Some(Err(message)) => {
                    outcome.failed.push((leg.id, message.clone()));
                    continue;
                }
                None => &[],
            };

            match match_closing_odds(&leg, candidates, self.config.line_tolerance) {
                Some(odds) => match self.bets.update_leg_closing_odds(leg.id, odds).await {
                    Ok(()) => {
                        tracing::debug!(
                            leg_id = %leg.id,
                            closing_odds = odds,
                            "Captured closing odds"
                        );
                        outcome.captured.push(leg.id);
                    }
                    Err(e) => {
                        tracing::warn!(
                            leg_id = %leg.id,
                            error = %e,
                            "Failed to store closing odds"
                        );
                        outcome.failed.push((leg.id, e.to_string()));
                    }
                },
                None => {
                    tracing::debug!(
                        leg_id = %leg.id,
                        market = ?leg.market,
                        "No closing snapshot matched"
                    );
                    outcome.unmatched.push(leg.id);
                }
            }
        }

        tracing::info!(
            game_id = %game_id,
            captured = outcome.captured.len(),
            unmatched = outcome.unmatched.len(),
            failed = outcome.failed.len(),
            "Closing line capture complete"
        );
        Ok(outcome)
    }

    /// Compute and store a leg's CLV, `None` until closing odds exist
    pub async fn calculate_clv(&self, leg_id: LegId) -> Result<Option<Decimal>, ClvError> {
        let leg = self
            .bets
            .get_leg(leg_id)
            .await?
            .ok_or(ClvError::LegNotFound(leg_id))?;

        let Some(closing) = leg.closing_odds else {
            return Ok(None);
        };

        let clv = calculate_clv(leg.effective_odds(), closing)?
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let category = categorize_clv(clv, &self.config);
        self.bets.update_leg_clv(leg_id, clv, category).await?;

        tracing::debug!(leg_id = %leg_id, clv = %clv, category = ?category, "Stored CLV");
        Ok(Some(clv))
    }

    /// Aggregate a user's CLV history
    pub async fn generate_report(
        &self,
        user_id: &str,
        filters: &ClvFilters,
    ) -> Result<ClvReport, ClvError> {
        let bets = self.bets.list_bets(user_id).await?;

        let game_ids: Vec<String> = {
            let mut ids: Vec<String> = bets.iter().flat_map(|b| b.game_ids()).collect();
            ids.sort();
            ids.dedup();
            ids
        };
        let sports: HashMap<String, _> = self
            .games
            .get_games(&game_ids)
            .await?
            .into_iter()
            .map(|g| (g.id, g.sport))
            .collect();

        let entries: Vec<ClvEntry> = bets
            .iter()
            .flat_map(|bet| {
                bet.legs.iter().filter_map(|leg| {
                    let clv = leg.clv?;
                    Some(ClvEntry {
                        clv,
                        category: leg
                            .clv_category
                            .unwrap_or_else(|| categorize_clv(clv, &self.config)),
                        sport: sports.get(&leg.game_id).copied(),
                        bookmaker: leg.bookmaker.clone(),
                        placed_at: bet.placed_at,
                        bet_status: bet.status,
                    })
                })
            })
            .filter(|e| filters.matches(e))
            .collect();

        Ok(ClvReport::from_entries(&entries))
    }
}

/// Price of the most recent quote matching a leg, as integer American odds
///
/// Spread and total quotes must sit within `tolerance` of the leg's line.
/// Among quotes sharing the latest timestamp the first one wins.
pub fn match_closing_odds(leg: &BetLeg, quotes: &[OddsQuote], tolerance: Decimal) -> Option<i32> {
    let leg_line = leg.line.or(leg.user_line);

    let mut best: Option<&OddsQuote> = None;
    for quote in quotes {
        if quote.market != leg.market || quote.selection != leg.selection {
            continue;
        }
        if leg.market.has_line() {
            match (leg_line, quote.line) {
                (Some(a), Some(b)) if (a - b).abs() <= tolerance => {}
                _ => continue,
            }
        }
        if best.map_or(true, |b| quote.timestamp > b.timestamp) {
            best = Some(quote);
        }
    }

    best.and_then(|q| {
        q.price
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i32()
            .filter(|odds| *odds != 0)
    })
}
