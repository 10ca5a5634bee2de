//! Odds types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Odds math errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OddsError {
    /// American odds of zero have no meaning
    #[error("Invalid American odds: {0}")]
    InvalidOdds(i32),
    /// Decimal odds below the 1.01 floor
    #[error("Invalid decimal odds: {0} (must be >= 1.01)")]
    InvalidDecimalOdds(Decimal),
    /// Parlay with no legs
    #[error("Parlay requires at least one leg")]
    EmptyParlay,
    /// Selection that does not apply to the market
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),
    /// Stake must be strictly positive
    #[error("Stake must be positive, got {0}")]
    NonPositiveStake(Decimal),
    /// Combined odds or payout too large to represent
    #[error("Odds or payout out of range")]
    PayoutOverflow,
}

/// Combined odds of a parlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParlayOdds {
    /// Product of every leg's decimal odds
    pub decimal: Decimal,
    /// Product converted back to American format
    pub american: i32,
}

/// Bet market (selection type)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    /// Straight win/lose, no line
    Moneyline,
    /// Point spread, line is the home team's handicap
    Spread,
    /// Combined score over/under a line
    Total,
}

impl MarketType {
    /// Market key used by odds feeds
    pub fn quote_key(&self) -> &'static str {
        match self {
            MarketType::Moneyline => "h2h",
            MarketType::Spread => "spreads",
            MarketType::Total => "totals",
        }
    }

    /// Parse an odds-feed market key
    pub fn from_quote_key(key: &str) -> Option<Self> {
        match key {
            "h2h" => Some(MarketType::Moneyline),
            "spreads" => Some(MarketType::Spread),
            "totals" => Some(MarketType::Total),
            _ => None,
        }
    }

    /// Whether a selection is meaningful for this market
    pub fn accepts(&self, selection: Selection) -> bool {
        match self {
            MarketType::Moneyline | MarketType::Spread => {
                matches!(selection, Selection::Home | Selection::Away)
            }
            MarketType::Total => matches!(selection, Selection::Over | Selection::Under),
        }
    }

    /// Whether the market carries a line
    pub fn has_line(&self) -> bool {
        !matches!(self, MarketType::Moneyline)
    }
}

/// Side of a market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    Home,
    Away,
    Over,
    Under,
}

impl std::str::FromStr for Selection {
    type Err = OddsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "home" => Ok(Selection::Home),
            "away" => Ok(Selection::Away),
            "over" => Ok(Selection::Over),
            "under" => Ok(Selection::Under),
            other => Err(OddsError::InvalidSelection(other.to_string())),
        }
    }
}

/// Sport key used for teaser pricing and CLV reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Nfl,
    Ncaaf,
    Nba,
    Ncaab,
    Mlb,
    Nhl,
}

impl Sport {
    /// Sport key used by The Odds API
    pub fn api_key(&self) -> &'static str {
        match self {
            Sport::Nfl => "americanfootball_nfl",
            Sport::Ncaaf => "americanfootball_ncaaf",
            Sport::Nba => "basketball_nba",
            Sport::Ncaab => "basketball_ncaab",
            Sport::Mlb => "baseball_mlb",
            Sport::Nhl => "icehockey_nhl",
        }
    }

    /// Short lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Sport::Nfl => "nfl",
            Sport::Ncaaf => "ncaaf",
            Sport::Nba => "nba",
            Sport::Ncaab => "ncaab",
            Sport::Mlb => "mlb",
            Sport::Nhl => "nhl",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Sport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nfl" | "americanfootball_nfl" => Ok(Sport::Nfl),
            "ncaaf" | "cfb" | "americanfootball_ncaaf" => Ok(Sport::Ncaaf),
            "nba" | "basketball_nba" => Ok(Sport::Nba),
            "ncaab" | "cbb" | "basketball_ncaab" => Ok(Sport::Ncaab),
            "mlb" | "baseball_mlb" => Ok(Sport::Mlb),
            "nhl" | "icehockey_nhl" => Ok(Sport::Nhl),
            other => Err(format!("unknown sport: {other}")),
        }
    }
}
