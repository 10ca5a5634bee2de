//! Settlement engine
//!
//! Leg outcomes from final scores, and bet outcomes from leg outcomes.
//! A leg or bet moves from pending to a terminal status once and is never
//! evaluated again.

mod aggregate;
mod outcome;
mod types;

pub use aggregate::{default_payout, determine_bet_outcome, reduced_parlay_payout};
pub use outcome::{
    determine_leg_outcome, determine_moneyline_outcome, determine_spread_outcome,
    determine_total_outcome,
};
pub use types::{BetSettlement, SettlementError};
