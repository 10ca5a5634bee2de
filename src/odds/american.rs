//! American/decimal odds conversion and payout math

use super::{OddsError, ParlayOdds};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Lowest decimal price a book will quote
const MIN_DECIMAL_ODDS: Decimal = dec!(1.01);

/// Convert American odds to decimal odds
///
/// - Positive odds (+150): profit per 100 staked, decimal = odds/100 + 1
/// - Negative odds (-150): stake needed to profit 100, decimal = 100/|odds| + 1
pub fn american_to_decimal(odds: i32) -> Result<Decimal, OddsError> {
    match odds {
        0 => Err(OddsError::InvalidOdds(odds)),
        o if o > 0 => Ok(Decimal::from(o) / dec!(100) + Decimal::ONE),
        o => Ok(dec!(100) / Decimal::from(o).abs() + Decimal::ONE),
    }
}

/// Convert decimal odds back to American odds, rounding half up
pub fn decimal_to_american(decimal: Decimal) -> Result<i32, OddsError> {
    if decimal < MIN_DECIMAL_ODDS {
        return Err(OddsError::InvalidDecimalOdds(decimal));
    }

    let raw = if decimal >= dec!(2) {
        (decimal - Decimal::ONE)
            .checked_mul(dec!(100))
            .ok_or(OddsError::PayoutOverflow)?
    } else {
        dec!(-100) / (decimal - Decimal::ONE)
    };

    round_half_up(raw).to_i32().ok_or(OddsError::PayoutOverflow)
}

/// Total return (stake + profit) for a winning bet, in cents
pub fn calculate_payout(stake: Decimal, odds: i32) -> Result<Decimal, OddsError> {
    ensure_positive_stake(stake)?;
    let decimal = american_to_decimal(odds)?;
    let payout = stake.checked_mul(decimal).ok_or(OddsError::PayoutOverflow)?;
    Ok(round_money(payout))
}

/// Profit for a winning bet (payout minus stake)
pub fn calculate_profit(stake: Decimal, odds: i32) -> Result<Decimal, OddsError> {
    Ok(calculate_payout(stake, odds)? - stake)
}

/// Combine independent legs into parlay odds
///
/// Decimal odds multiply across legs, so the result does not depend on
/// leg order.
pub fn calculate_parlay_odds(legs: &[i32]) -> Result<ParlayOdds, OddsError> {
    if legs.is_empty() {
        return Err(OddsError::EmptyParlay);
    }

    let decimal = legs.iter().try_fold(Decimal::ONE, |acc, &odds| {
        let d = american_to_decimal(odds)?;
        acc.checked_mul(d).ok_or(OddsError::PayoutOverflow)
    })?;

    Ok(ParlayOdds {
        decimal,
        american: decimal_to_american(decimal)?,
    })
}

/// Total return of a winning parlay priced from the exact decimal product
pub fn calculate_parlay_payout(stake: Decimal, legs: &[i32]) -> Result<Decimal, OddsError> {
    ensure_positive_stake(stake)?;
    let parlay = calculate_parlay_odds(legs)?;
    let payout = stake
        .checked_mul(parlay.decimal)
        .ok_or(OddsError::PayoutOverflow)?;
    Ok(round_money(payout))
}

/// Implied win probability of an American price
pub fn calculate_implied_probability(odds: i32) -> Result<Decimal, OddsError> {
    Ok(Decimal::ONE / american_to_decimal(odds)?)
}

/// Round a currency amount to cents
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn round_half_up(value: Decimal) -> Decimal {
    (value + dec!(0.5)).floor()
}

fn ensure_positive_stake(stake: Decimal) -> Result<(), OddsError> {
    if stake <= Decimal::ZERO {
        return Err(OddsError::NonPositiveStake(stake));
    }
    Ok(())
}
