//! Storage types

use crate::odds::Sport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Game lifecycle as reported by the schedule feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Scheduled,
    InProgress,
    Final,
}

/// A scheduled sporting event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    /// Event identifier from the odds feed
    pub id: String,
    pub sport: Sport,
    pub home_team: String,
    pub away_team: String,
    pub start_time: DateTime<Utc>,
    pub status: GameStatus,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
}

impl Game {
    /// Whether bets on this game are locked
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.status != GameStatus::Scheduled || self.start_time <= now
    }

    /// Final score as (home, away), once the game is final
    pub fn final_score(&self) -> Option<(u32, u32)> {
        match (self.status, self.home_score, self.away_score) {
            (GameStatus::Final, Some(home), Some(away)) => Some((home, away)),
            _ => None,
        }
    }
}

/// Persistence errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Bet not found: {0}")]
    BetNotFound(Uuid),
    #[error("Leg not found: {0}")]
    LegNotFound(Uuid),
    #[error("Future leg not found: {0}")]
    FutureLegNotFound(Uuid),
    #[error("Game not found: {0}")]
    GameNotFound(String),
    /// Conditional update refused because the row is no longer pending
    #[error("Record {0} is already settled")]
    AlreadySettled(Uuid),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
