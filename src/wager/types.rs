//! Wager types

use crate::odds::{MarketType, OddsError, Selection, Sport};
use crate::settlement::SettlementError;
use crate::store::StoreError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Bet identifier
pub type BetId = Uuid;

/// Bet leg identifier
pub type LegId = Uuid;

/// Kind of wager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetType {
    /// One selection
    Single,
    /// Two or more selections, all must win or push
    Parlay,
    /// Parlay with every line moved by fixed points, paid from a table
    Teaser,
}

impl fmt::Display for BetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BetType::Single => "single",
            BetType::Parlay => "parlay",
            BetType::Teaser => "teaser",
        };
        f.write_str(s)
    }
}

/// Settlement state of a bet, leg or future
///
/// Moves from `Pending` to one terminal state exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetStatus {
    Pending,
    Won,
    Lost,
    Push,
}

impl BetStatus {
    /// Whether the status is final
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BetStatus::Pending)
    }
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BetStatus::Pending => "pending",
            BetStatus::Won => "won",
            BetStatus::Lost => "lost",
            BetStatus::Push => "push",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for BetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(BetStatus::Pending),
            "won" | "win" => Ok(BetStatus::Won),
            "lost" | "loss" => Ok(BetStatus::Lost),
            "push" | "pushed" => Ok(BetStatus::Push),
            other => Err(format!("unknown bet status: {other}")),
        }
    }
}

/// Direction the market moved after the bet was placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClvCategory {
    Positive,
    Neutral,
    Negative,
}

/// One game selection within a bet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetLeg {
    /// Leg identifier
    pub id: LegId,
    /// Parent bet
    pub bet_id: BetId,
    /// Referenced game
    pub game_id: String,
    /// Market the leg is priced in
    pub market: MarketType,
    /// Side taken
    pub selection: Selection,
    /// Quoted line (home handicap for spreads, points for totals)
    pub line: Option<Decimal>,
    /// Quoted American odds
    pub odds: i32,
    /// Line the user entered over the quote
    pub user_line: Option<Decimal>,
    /// Odds the user entered over the quote
    pub user_odds: Option<i32>,
    /// Line after teaser points (teasers only)
    pub teaser_line: Option<Decimal>,
    /// Odds in force near kickoff
    pub closing_odds: Option<i32>,
    /// Closing line value in percent
    pub clv: Option<Decimal>,
    pub clv_category: Option<ClvCategory>,
    /// Shared by legs of the same game within one bet
    pub sgp_group: Option<Uuid>,
    /// Book the price was taken from
    pub bookmaker: Option<String>,
    pub team_name: Option<String>,
    pub status: BetStatus,
}

impl BetLeg {
    /// Line used for settlement: user override, then teaser line, then quote
    pub fn effective_line(&self) -> Option<Decimal> {
        self.user_line.or(self.teaser_line).or(self.line)
    }

    /// Odds used for pricing and CLV
    pub fn effective_odds(&self) -> i32 {
        self.user_odds.unwrap_or(self.odds)
    }
}

/// A futures selection with no game reference (e.g. season winner)
///
/// Futures are only settled by an operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureLeg {
    pub id: Uuid,
    pub bet_id: BetId,
    pub description: String,
    pub odds: i32,
    pub status: BetStatus,
}

/// A wager and all of its selections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bet {
    /// Bet identifier
    pub id: BetId,
    /// Owner
    pub user_id: String,
    /// Display name
    pub name: String,
    pub bet_type: BetType,
    /// Amount wagered
    pub stake: Decimal,
    /// Combined American odds at placement
    pub odds: i32,
    /// Return if every selection wins
    pub potential_payout: Decimal,
    /// Settled return, `None` while pending
    pub actual_payout: Option<Decimal>,
    pub status: BetStatus,
    /// Points moved on every leg (teasers only)
    pub teaser_points: Option<Decimal>,
    /// Sport whose teaser table prices the bet (teasers only)
    pub teaser_sport: Option<Sport>,
    pub notes: Option<String>,
    pub placed_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
    pub legs: Vec<BetLeg>,
    #[serde(default)]
    pub futures: Vec<FutureLeg>,
}

impl Bet {
    /// Number of selections (game legs plus futures)
    pub fn selection_count(&self) -> usize {
        self.legs.len() + self.futures.len()
    }

    /// Whether the bet is still open
    pub fn is_pending(&self) -> bool {
        self.status == BetStatus::Pending
    }

    /// Distinct game ids referenced by the legs
    pub fn game_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.legs.iter().map(|l| l.game_id.clone()).collect();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Effective odds of every selection, legs first
    pub fn selection_odds(&self) -> Vec<i32> {
        self.legs
            .iter()
            .map(|l| l.effective_odds())
            .chain(self.futures.iter().map(|f| f.odds))
            .collect()
    }

    /// Whether every leg and future has reached a terminal status
    pub fn all_selections_terminal(&self) -> bool {
        self.legs.iter().all(|l| l.status.is_terminal())
            && self.futures.iter().all(|f| f.status.is_terminal())
    }
}

/// One game selection in a new bet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegInput {
    pub game_id: String,
    pub market: MarketType,
    pub selection: Selection,
    #[serde(default)]
    pub line: Option<Decimal>,
    pub odds: i32,
    #[serde(default)]
    pub user_line: Option<Decimal>,
    #[serde(default)]
    pub user_odds: Option<i32>,
    #[serde(default)]
    pub bookmaker: Option<String>,
    #[serde(default)]
    pub team_name: Option<String>,
}

/// One futures selection in a new bet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FutureInput {
    pub description: String,
    pub odds: i32,
}

/// Request to place a bet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBetInput {
    pub user_id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub bet_type: BetType,
    pub stake: Decimal,
    #[serde(default)]
    pub legs: Vec<LegInput>,
    #[serde(default)]
    pub futures: Vec<FutureInput>,
    #[serde(default)]
    pub teaser_points: Option<Decimal>,
    #[serde(default)]
    pub teaser_sport: Option<Sport>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// User edits allowed while a bet is pending and no game has started
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BetEdit {
    pub name: Option<String>,
    pub stake: Option<Decimal>,
    pub notes: Option<String>,
}

/// Bet creation and mutation errors
#[derive(Debug, Error)]
pub enum WagerError {
    #[error("Bet must have at least one selection")]
    EmptyLegs,
    #[error("{bet_type} bet cannot have {count} selections")]
    WrongLegCountForType { bet_type: BetType, count: usize },
    #[error("Teaser requires a point value")]
    TeaserRequiresPoints,
    #[error("Teaser requires a sport")]
    TeaserRequiresSport,
    #[error("Teaser cannot include moneyline legs")]
    TeaserForbidsMoneyline,
    #[error("Teaser cannot include futures")]
    TeaserForbidsFutures,
    #[error("Games not found: {0:?}")]
    GameNotFound(Vec<String>),
    #[error("Games already started or finished: {0:?}")]
    GameAlreadyStartedOrFinished(Vec<String>),
    #[error("Stake must be positive, got {0}")]
    NonPositiveStake(Decimal),
    #[error("No teaser odds for {legs} legs at {points} points ({sport})")]
    InvalidTeaserConfiguration {
        sport: Sport,
        points: Decimal,
        legs: usize,
    },
    #[error("Selection {selection:?} is not valid for {market:?}")]
    InvalidSelection {
        market: MarketType,
        selection: Selection,
    },
    #[error("{0:?} leg requires a line")]
    MissingLine(MarketType),
    #[error("Bet not found: {0}")]
    BetNotFound(BetId),
    #[error("Future leg not found: {0}")]
    FutureLegNotFound(Uuid),
    #[error("Bet {0} is already settled")]
    AlreadySettled(BetId),
    #[error("Game {0} has already started")]
    GameAlreadyStarted(String),
    #[error("Cannot settle to {0}")]
    InvalidSettlementStatus(BetStatus),
    #[error(transparent)]
    Odds(#[from] OddsError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Settlement(#[from] SettlementError),
}
