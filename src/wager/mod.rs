//! Wagers
//!
//! Bets, their legs and futures, validation and pricing at placement, and
//! per-user statistics. Construction is pure; persistence goes through
//! `store::BetStore`.

mod builder;
mod sgp;
mod stats;
mod types;

pub use builder::{price_bet, teaser_terms, validate_shape, BetBuilder};
pub use sgp::assign_sgp_groups;
pub use stats::BetStats;
pub use types::{
    Bet, BetEdit, BetId, BetLeg, BetStatus, BetType, ClvCategory, CreateBetInput, FutureInput,
    FutureLeg, LegId, LegInput, WagerError,
};
