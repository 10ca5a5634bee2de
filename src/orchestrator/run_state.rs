//! Settlement run history owned by the scheduler

use super::ResolutionSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bookkeeping for periodic settlement passes
///
/// `is_running` stays set if a pass is dropped before finishing, which
/// blocks further passes until `reset` is called.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunState {
    pub is_running: bool,
    pub last_started_at: Option<DateTime<Utc>>,
    pub last_finished_at: Option<DateTime<Utc>>,
    pub last_result: Option<ResolutionSummary>,
    pub total_runs: u64,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a pass as started, false if one is already running
    pub fn try_start(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_running {
            return false;
        }
        self.is_running = true;
        self.last_started_at = Some(now);
        true
    }

    /// Record a finished pass
    pub fn finish(&mut self, now: DateTime<Utc>, result: ResolutionSummary) {
        self.is_running = false;
        self.last_finished_at = Some(now);
        self.last_result = Some(result);
        self.total_runs += 1;
    }

    /// Clear a stuck running flag
    pub fn reset(&mut self) {
        self.is_running = false;
    }
}
