//! Orchestrator batch results

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a batch failure was working on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchScope {
    /// Listing candidate games
    Query,
    /// Score lookup or game update
    Game,
    Leg,
    Bet,
    /// Closing line capture or CLV
    Capture,
}

impl fmt::Display for BatchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BatchScope::Query => "query",
            BatchScope::Game => "game",
            BatchScope::Leg => "leg",
            BatchScope::Bet => "bet",
            BatchScope::Capture => "capture",
        };
        f.write_str(s)
    }
}

/// One failure collected during a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    pub scope: BatchScope,
    /// Game, leg or bet id
    pub id: String,
    pub message: String,
}

impl BatchError {
    pub fn new(scope: BatchScope, id: impl ToString, err: impl fmt::Display) -> Self {
        Self {
            scope,
            id: id.to_string(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}] {}", self.scope, self.id, self.message)
    }
}

/// Result of one settlement pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionSummary {
    /// Games considered
    pub games_checked: usize,
    /// Games newly marked final
    pub games_updated: usize,
    pub legs_settled: usize,
    pub bets_settled: usize,
    pub errors: Vec<BatchError>,
}

/// Result of one closing line pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSummary {
    pub games_checked: usize,
    pub legs_captured: usize,
    pub legs_unmatched: usize,
    pub clv_calculated: usize,
    pub errors: Vec<BatchError>,
}
