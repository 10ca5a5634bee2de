//! Settlement types

use crate::odds::{MarketType, OddsError, Selection};
use crate::wager::BetStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Settlement errors, fatal for one leg only
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettlementError {
    /// Spread or total leg without any line
    #[error("Leg {0} has no line to settle against")]
    MissingLine(Uuid),
    /// Selection that does not belong to the market
    #[error("Selection {selection:?} cannot settle a {market:?} market")]
    InvalidSelection {
        market: MarketType,
        selection: Selection,
    },
    #[error(transparent)]
    Odds(#[from] OddsError),
}

/// Final result of a bet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetSettlement {
    pub status: BetStatus,
    pub actual_payout: Decimal,
}
