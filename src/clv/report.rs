//! CLV aggregation

use crate::odds::Sport;
use crate::wager::{BetStatus, ClvCategory};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bucket used when a leg has no sport or bookmaker
const UNKNOWN: &str = "unknown";

/// One scored leg, flattened with the context reports group by
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClvEntry {
    pub clv: Decimal,
    pub category: ClvCategory,
    pub sport: Option<Sport>,
    pub bookmaker: Option<String>,
    /// Placement time of the parent bet
    pub placed_at: DateTime<Utc>,
    /// Status of the parent bet
    pub bet_status: BetStatus,
}

/// Report filters; unset fields match everything
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClvFilters {
    pub sport: Option<Sport>,
    pub bookmaker: Option<String>,
    /// Inclusive lower bound on placement time
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on placement time
    pub to: Option<DateTime<Utc>>,
}

impl ClvFilters {
    pub fn matches(&self, entry: &ClvEntry) -> bool {
        if self.sport.is_some() && entry.sport != self.sport {
            return false;
        }
        if let Some(ref book) = self.bookmaker {
            let same = entry
                .bookmaker
                .as_deref()
                .is_some_and(|b| b.eq_ignore_ascii_case(book));
            if !same {
                return false;
            }
        }
        if self.from.is_some_and(|from| entry.placed_at < from) {
            return false;
        }
        if self.to.is_some_and(|to| entry.placed_at >= to) {
            return false;
        }
        true
    }
}

/// CLV statistics over a set of legs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClvSummary {
    pub count: usize,
    /// Mean CLV in percent, `None` when empty
    pub mean_clv: Option<Decimal>,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    /// Positive-CLV legs whose bet won, over positive-CLV legs whose bet settled
    pub clv_win_rate: Option<Decimal>,
}

impl ClvSummary {
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a ClvEntry>) -> Self {
        let mut summary = ClvSummary::default();
        let mut total = Decimal::ZERO;
        let mut positive_settled = 0usize;
        let mut positive_won = 0usize;

        for entry in entries {
            summary.count += 1;
            total += entry.clv;
            match entry.category {
                ClvCategory::Positive => {
                    summary.positive += 1;
                    if entry.bet_status.is_terminal() {
                        positive_settled += 1;
                    }
                    if entry.bet_status == BetStatus::Won {
                        positive_won += 1;
                    }
                }
                ClvCategory::Neutral => summary.neutral += 1,
                ClvCategory::Negative => summary.negative += 1,
            }
        }

        if summary.count > 0 {
            summary.mean_clv = Some((total / Decimal::from(summary.count)).round_dp(2));
        }
        if positive_settled > 0 {
            summary.clv_win_rate = Some(
                (Decimal::from(positive_won) / Decimal::from(positive_settled)).round_dp(4),
            );
        }
        summary
    }
}

/// CLV report with breakdowns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClvReport {
    pub overall: ClvSummary,
    pub by_sport: BTreeMap<String, ClvSummary>,
    pub by_bookmaker: BTreeMap<String, ClvSummary>,
    /// Keyed by placement month, `YYYY-MM`
    pub by_period: BTreeMap<String, ClvSummary>,
}

impl ClvReport {
    pub fn from_entries(entries: &[ClvEntry]) -> Self {
        let by_sport = group(entries, |e| {
            e.sport.map_or(UNKNOWN.to_string(), |s| s.as_str().to_string())
        });
        let by_bookmaker = group(entries, |e| {
            e.bookmaker
                .as_deref()
                .map_or(UNKNOWN.to_string(), str::to_ascii_lowercase)
        });
        let by_period = group(entries, |e| e.placed_at.format("%Y-%m").to_string());

        Self {
            overall: ClvSummary::from_entries(entries),
            by_sport,
            by_bookmaker,
            by_period,
        }
    }
}

fn group(
    entries: &[ClvEntry],
    key: impl Fn(&ClvEntry) -> String,
) -> BTreeMap<String, ClvSummary> {
    let mut buckets: BTreeMap<String, Vec<&ClvEntry>> = BTreeMap::new();
    for entry in entries {
        buckets.entry(key(entry)).or_default().push(entry);
    }
    buckets
        .into_iter()
        .map(|(k, v)| (k, ClvSummary::from_entries(v)))
        .collect()
}
