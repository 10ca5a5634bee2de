//! Closing line types

use crate::odds::OddsError;
use crate::store::StoreError;
use crate::wager::LegId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result of capturing closing odds for one game
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureOutcome {
    pub game_id: String,
    /// Legs that received closing odds
    pub captured: Vec<LegId>,
    /// Legs with no matching snapshot, left uncaptured
    pub unmatched: Vec<LegId>,
    /// Legs whose lookup or write failed, with the error
    pub failed: Vec<(LegId, String)>,
    /// Legs captured on an earlier pass that still have no CLV
    pub awaiting_clv: Vec<LegId>,
}

/// Closing line errors
#[derive(Debug, Error)]
pub enum ClvError {
    #[error("Leg not found: {0}")]
    LegNotFound(LegId),
    #[error(transparent)]
    Odds(#[from] OddsError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
