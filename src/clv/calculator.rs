//! Closing line value math

use crate::config::ClvConfig;
use crate::odds::{calculate_implied_probability, OddsError};
use crate::wager::ClvCategory;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Percent change in implied probability from the price taken to the close
///
/// Positive when the market moved toward the selection after the bet, i.e.
/// the bettor beat the closing line.
pub fn calculate_clv(opening_odds: i32, closing_odds: i32) -> Result<Decimal, OddsError> {
    let opening = calculate_implied_probability(opening_odds)?;
    let closing = calculate_implied_probability(closing_odds)?;
    Ok((closing - opening) / opening * dec!(100))
}

/// Bucket a CLV value against the configured thresholds
pub fn categorize_clv(clv: Decimal, config: &ClvConfig) -> ClvCategory {
    if clv > config.positive_threshold {
        ClvCategory::Positive
    } else if clv < config.negative_threshold {
        ClvCategory::Negative
    } else {
        ClvCategory::Neutral
    }
}
