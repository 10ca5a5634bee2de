//! Bet construction and pricing
//!
//! Turns a `CreateBetInput` into a priced, pending `Bet`. Runs every check
//! before anything is persisted; the caller supplies the referenced games.

use super::sgp::assign_sgp_groups;
use super::{Bet, BetLeg, BetStatus, BetType, CreateBetInput, FutureLeg, WagerError};
use crate::odds::{
    apply_teaser_adjustment, calculate_parlay_odds, calculate_parlay_payout, calculate_payout,
    teaser_odds, MarketType, Sport,
};
use crate::store::Game;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

/// Builds pending bets against a snapshot of the referenced games
pub struct BetBuilder<'a> {
    games: HashMap<&'a str, &'a Game>,
    now: DateTime<Utc>,
}

impl<'a> BetBuilder<'a> {
    /// Create a builder over the games a bet may reference
    pub fn new(games: &'a [Game], now: DateTime<Utc>) -> Self {
        Self {
            games: games.iter().map(|g| (g.id.as_str(), g)).collect(),
            now,
        }
    }

    /// Validate and price a new bet
    pub fn build(&self, input: CreateBetInput) -> Result<Bet, WagerError> {
        validate_shape(&input)?;
        self.validate_games(&input)?;

        let bet_id = Uuid::new_v4();
        let teaser = teaser_terms(&input);

        let mut legs: Vec<BetLeg> = input
            .legs
            .into_iter()
            .map(|l| {
                let teaser_line = teaser.and_then(|(_, points)| {
                    l.line
                        .or(l.user_line)
                        .map(|line| apply_teaser_adjustment(line, points, l.selection))
                });
                BetLeg {
                    id: Uuid::new_v4(),
                    bet_id,
                    game_id: l.game_id,
                    market: l.market,
                    selection: l.selection,
                    line: l.line,
                    odds: l.odds,
                    user_line: l.user_line,
                    user_odds: l.user_odds,
                    teaser_line,
                    closing_odds: None,
                    clv: None,
                    clv_category: None,
                    sgp_group: None,
                    bookmaker: l.bookmaker,
                    team_name: l.team_name,
                    status: BetStatus::Pending,
                }
            })
            .collect();
        assign_sgp_groups(&mut legs);

        let futures: Vec<FutureLeg> = input
            .futures
            .into_iter()
            .map(|f| FutureLeg {
                id: Uuid::new_v4(),
                bet_id,
                description: f.description,
                odds: f.odds,
                status: BetStatus::Pending,
            })
            .collect();

        let selection_odds: Vec<i32> = legs
            .iter()
            .map(|l| l.effective_odds())
            .chain(futures.iter().map(|f| f.odds))
            .collect();
        let (odds, potential_payout) =
            price_bet(input.bet_type, input.stake, &selection_odds, teaser)?;

        let name = input
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| default_name(input.bet_type, &legs, &futures, teaser));

        Ok(Bet {
            id: bet_id,
            user_id: input.user_id,
            name,
            bet_type: input.bet_type,
            stake: input.stake,
            odds,
            potential_payout,
            actual_payout: None,
            status: BetStatus::Pending,
            teaser_points: input.teaser_points,
            teaser_sport: input.teaser_sport,
            notes: input.notes,
            placed_at: self.now,
            settled_at: None,
            legs,
            futures,
        })
    }

    fn validate_games(&self, input: &CreateBetInput) -> Result<(), WagerError> {
        let ids: BTreeSet<&str> = input.legs.iter().map(|l| l.game_id.as_str()).collect();

        let missing: Vec<String> = ids
            .iter()
            .filter(|id| !self.games.contains_key(*id))
            .map(|id| id.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(WagerError::GameNotFound(missing));
        }

        let started: Vec<String> = ids
            .iter()
            .filter(|id| {
                self.games
                    .get(*id)
                    .is_some_and(|g| g.has_started(self.now))
            })
            .map(|id| id.to_string())
            .collect();
        if !started.is_empty() {
            return Err(WagerError::GameAlreadyStartedOrFinished(started));
        }

        Ok(())
    }
}

/// Checks that need no game data, in reporting order
pub fn validate_shape(input: &CreateBetInput) -> Result<(), WagerError> {
    let count = input.legs.len() + input.futures.len();
    if count == 0 {
        return Err(WagerError::EmptyLegs);
    }

    let count_ok = match input.bet_type {
        BetType::Single => count == 1,
        BetType::Parlay | BetType::Teaser => count >= 2,
    };
    if !count_ok {
        return Err(WagerError::WrongLegCountForType {
            bet_type: input.bet_type,
            count,
        });
    }

    if input.stake <= Decimal::ZERO {
        return Err(WagerError::NonPositiveStake(input.stake));
    }

    if input.bet_type == BetType::Teaser {
        if input.teaser_points.is_none() {
            return Err(WagerError::TeaserRequiresPoints);
        }
        if input.teaser_sport.is_none() {
            return Err(WagerError::TeaserRequiresSport);
        }
        if input.legs.iter().any(|l| l.market == MarketType::Moneyline) {
            return Err(WagerError::TeaserForbidsMoneyline);
        }
        if !input.futures.is_empty() {
            return Err(WagerError::TeaserForbidsFutures);
        }
    }

    for leg in &input.legs {
        if !leg.market.accepts(leg.selection) {
            return Err(WagerError::InvalidSelection {
                market: leg.market,
                selection: leg.selection,
            });
        }
        if leg.market.has_line() && leg.line.or(leg.user_line).is_none() {
            return Err(WagerError::MissingLine(leg.market));
        }
    }

    Ok(())
}

/// Combined American odds and potential payout
///
/// `selection_odds` are the effective odds of every selection. Teasers are
/// priced from the table for `(sport, points)` and ignore the leg odds.
pub fn price_bet(
    bet_type: BetType,
    stake: Decimal,
    selection_odds: &[i32],
    teaser: Option<(Sport, Decimal)>,
) -> Result<(i32, Decimal), WagerError> {
    match bet_type {
        BetType::Single => {
            let odds = *selection_odds.first().ok_or(WagerError::EmptyLegs)?;
            Ok((odds, calculate_payout(stake, odds)?))
        }
        BetType::Parlay => {
            let parlay = calculate_parlay_odds(selection_odds)?;
            Ok((parlay.american, calculate_parlay_payout(stake, selection_odds)?))
        }
        BetType::Teaser => {
            let (sport, points) = teaser.ok_or(WagerError::TeaserRequiresPoints)?;
            let legs = selection_odds.len();
            let odds = teaser_odds(sport, points, legs)
                .ok_or(WagerError::InvalidTeaserConfiguration { sport, points, legs })?;
            Ok((odds, calculate_payout(stake, odds)?))
        }
    }
}

/// Teaser sport and points, when both are present
pub fn teaser_terms(input: &CreateBetInput) -> Option<(Sport, Decimal)> {
    match (input.bet_type, input.teaser_sport, input.teaser_points) {
        (BetType::Teaser, Some(sport), Some(points)) => Some((sport, points)),
        _ => None,
    }
}

fn default_name(
    bet_type: BetType,
    legs: &[BetLeg],
    futures: &[FutureLeg],
    teaser: Option<(Sport, Decimal)>,
) -> String {
    let count = legs.len() + futures.len();
    match bet_type {
        BetType::Single => legs
            .first()
            .and_then(|l| l.team_name.clone())
            .or_else(|| futures.first().map(|f| f.description.clone()))
            .unwrap_or_else(|| "Single".to_string()),
        BetType::Parlay => format!("{count}-leg parlay"),
        BetType::Teaser => match teaser {
            Some((sport, points)) => format!("{count}-leg {sport} teaser ({points} pts)"),
            None => format!("{count}-leg teaser"),
        },
    }
}
