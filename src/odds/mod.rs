//! Odds math
//!
//! Pure conversions between American and decimal odds, payouts, parlay
//! combination, implied probability and teaser pricing. No state, no I/O.

mod american;
mod teaser;
mod types;

pub use american::{
    american_to_decimal, calculate_implied_probability, calculate_parlay_odds,
    calculate_parlay_payout, calculate_payout, calculate_profit, decimal_to_american,
    round_money,
};
pub use teaser::{apply_teaser_adjustment, teaser_odds};
pub use types::{MarketType, OddsError, ParlayOdds, Selection, Sport};
