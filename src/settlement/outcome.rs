//! Leg outcome rules

use super::SettlementError;
use crate::odds::{MarketType, Selection};
use crate::wager::{BetLeg, BetStatus};
use rust_decimal::Decimal;
use std::cmp::Ordering;

/// Moneyline: a tie pushes, otherwise the selected team must win
pub fn determine_moneyline_outcome(
    selection: Selection,
    home_score: u32,
    away_score: u32,
) -> Result<BetStatus, SettlementError> {
    let home_result = match home_score.cmp(&away_score) {
        Ordering::Equal => return Ok(BetStatus::Push),
        Ordering::Greater => BetStatus::Won,
        Ordering::Less => BetStatus::Lost,
    };
    side_outcome(MarketType::Moneyline, selection, home_result)
}

/// Spread: `line` is the home team's handicap
///
/// The home side covers when `(home - away) + line > 0`, the away side when
/// it is below zero, and exactly zero pushes.
pub fn determine_spread_outcome(
    selection: Selection,
    line: Decimal,
    home_score: u32,
    away_score: u32,
) -> Result<BetStatus, SettlementError> {
    let differential = Decimal::from(home_score) - Decimal::from(away_score);
    let cover = differential + line;

    let home_result = match cover.cmp(&Decimal::ZERO) {
        Ordering::Equal => return Ok(BetStatus::Push),
        Ordering::Greater => BetStatus::Won,
        Ordering::Less => BetStatus::Lost,
    };
    side_outcome(MarketType::Spread, selection, home_result)
}

/// Total: combined score against the line, landing on it pushes
pub fn determine_total_outcome(
    selection: Selection,
    line: Decimal,
    total_score: u32,
) -> Result<BetStatus, SettlementError> {
    let over_result = match Decimal::from(total_score).cmp(&line) {
        Ordering::Equal => return Ok(BetStatus::Push),
        Ordering::Greater => BetStatus::Won,
        Ordering::Less => BetStatus::Lost,
    };

    match selection {
        Selection::Over => Ok(over_result),
        Selection::Under => Ok(flip(over_result)),
        other => Err(SettlementError::InvalidSelection {
            market: MarketType::Total,
            selection: other,
        }),
    }
}

/// Settle one leg against a final score using its effective line
pub fn determine_leg_outcome(
    leg: &BetLeg,
    home_score: u32,
    away_score: u32,
) -> Result<BetStatus, SettlementError> {
    match leg.market {
        MarketType::Moneyline => determine_moneyline_outcome(leg.selection, home_score, away_score),
        MarketType::Spread => {
            let line = leg
                .effective_line()
                .ok_or(SettlementError::MissingLine(leg.id))?;
            determine_spread_outcome(leg.selection, line, home_score, away_score)
        }
        MarketType::Total => {
            let line = leg
                .effective_line()
                .ok_or(SettlementError::MissingLine(leg.id))?;
            determine_total_outcome(leg.selection, line, home_score + away_score)
        }
    }
}

fn side_outcome(
    market: MarketType,
    selection: Selection,
    home_result: BetStatus,
) -> Result<BetStatus, SettlementError> {
    match selection {
        Selection::Home => Ok(home_result),
        Selection::Away => Ok(flip(home_result)),
        other => Err(SettlementError::InvalidSelection {
            market,
            selection: other,
        }),
    }
}

fn flip(status: BetStatus) -> BetStatus {
    match status {
        BetStatus::Won => BetStatus::Lost,
        BetStatus::Lost => BetStatus::Won,
        other => other,
    }
}
