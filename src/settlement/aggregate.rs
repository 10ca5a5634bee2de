//! Bet outcome from leg outcomes

use super::{BetSettlement, SettlementError};
use crate::odds::{calculate_parlay_payout, calculate_payout};
use crate::wager::{Bet, BetStatus, BetType};
use rust_decimal::Decimal;

/// Resolve a bet once every leg and future is terminal
///
/// - any lost selection loses the bet, payout zero
/// - all pushes return the stake
/// - otherwise the bet wins; a parlay with pushes is re-priced on the
///   selections that won, every other win pays the placed potential payout
///
/// Returns `None` while any selection is still pending.
pub fn determine_bet_outcome(bet: &Bet) -> Result<Option<BetSettlement>, SettlementError> {
    if !bet.all_selections_terminal() {
        return Ok(None);
    }

    // (status, effective odds) for every selection
    let selections: Vec<(BetStatus, i32)> = bet
        .legs
        .iter()
        .map(|l| (l.status, l.effective_odds()))
        .chain(bet.futures.iter().map(|f| (f.status, f.odds)))
        .collect();

    if selections.iter().any(|(s, _)| *s == BetStatus::Lost) {
        return Ok(Some(BetSettlement {
            status: BetStatus::Lost,
            actual_payout: Decimal::ZERO,
        }));
    }

    if selections.iter().all(|(s, _)| *s == BetStatus::Push) {
        return Ok(Some(BetSettlement {
            status: BetStatus::Push,
            actual_payout: bet.stake,
        }));
    }

    let has_push = selections.iter().any(|(s, _)| *s == BetStatus::Push);
    let actual_payout = if has_push && bet.bet_type == BetType::Parlay {
        let winners: Vec<i32> = selections
            .iter()
            .filter(|(s, _)| *s == BetStatus::Won)
            .map(|(_, odds)| *odds)
            .collect();
        reduced_parlay_payout(bet.stake, &winners)?
    } else {
        bet.potential_payout
    };

    Ok(Some(BetSettlement {
        status: BetStatus::Won,
        actual_payout,
    }))
}

/// Payout of a parlay after pushed legs drop out
///
/// No winners left returns the stake, one winner pays as a single, more
/// pay as a smaller parlay.
pub fn reduced_parlay_payout(stake: Decimal, winning_odds: &[i32]) -> Result<Decimal, SettlementError> {
    match winning_odds {
        [] => Ok(stake),
        [odds] => Ok(calculate_payout(stake, *odds)?),
        legs => Ok(calculate_parlay_payout(stake, legs)?),
    }
}

/// Payout an operator settlement implies when none is given
pub fn default_payout(bet: &Bet, status: BetStatus) -> Decimal {
    match status {
        BetStatus::Won => bet.potential_payout,
        BetStatus::Push => bet.stake,
        BetStatus::Lost | BetStatus::Pending => Decimal::ZERO,
    }
}
