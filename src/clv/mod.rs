//! Closing line value
//!
//! Captures the odds in force near kickoff for each pending leg and scores
//! the price taken against them. A positive CLV means the bettor got a
//! better number than the market settled on.

mod calculator;
mod capture;
mod report;
mod types;

pub use calculator::{calculate_clv, categorize_clv};
pub use capture::{match_closing_odds, ClosingLineTracker};
pub use report::{ClvEntry, ClvFilters, ClvReport, ClvSummary};
pub use types::{CaptureOutcome, ClvError};
