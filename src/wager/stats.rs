//! Per-user betting statistics

use super::{Bet, BetStatus};
use crate::odds::round_money;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Summary of a user's betting record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BetStats {
    pub total_bets: usize,
    pub pending: usize,
    pub won: usize,
    pub lost: usize,
    pub push: usize,
    /// won / (won + lost), `None` before any decided bet
    pub win_rate: Option<Decimal>,
    /// Stake across every bet, pending included
    pub total_staked: Decimal,
    /// Stake across settled bets
    pub settled_staked: Decimal,
    /// Payouts received on settled bets
    pub total_returned: Decimal,
    pub net_profit: Decimal,
    /// Net profit over settled stake, in percent
    pub roi: Option<Decimal>,
}

impl BetStats {
    /// Aggregate a set of bets
    pub fn from_bets(bets: &[Bet]) -> Self {
        let mut stats = BetStats {
            total_bets: bets.len(),
            ..Default::default()
        };

        for bet in bets {
            stats.total_staked += bet.stake;
            match bet.status {
                BetStatus::Pending => {
                    stats.pending += 1;
                    continue;
                }
                BetStatus::Won => stats.won += 1,
                BetStatus::Lost => stats.lost += 1,
                BetStatus::Push => stats.push += 1,
            }
            stats.settled_staked += bet.stake;
            stats.total_returned += bet.actual_payout.unwrap_or_default();
        }

        stats.net_profit = stats.total_returned - stats.settled_staked;

        let decided = stats.won + stats.lost;
        if decided > 0 {
            stats.win_rate = Some(
                (Decimal::from(stats.won) / Decimal::from(decided)).round_dp(4),
            );
        }
        if stats.settled_staked > Decimal::ZERO {
            stats.roi = Some(round_money(
                stats.net_profit / stats.settled_staked * dec!(100),
            ));
        }

        stats
    }
}
