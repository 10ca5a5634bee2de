//! Settlement commands

use super::{print_json, Ledger};
use crate::config::Config;
use crate::orchestrator::RunState;
use crate::wager::BetStatus;
use chrono::Utc;
use clap::Args;
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Args, Debug)]
pub struct SettleArgs {
    /// Keep running, settling every N seconds
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// Also capture closing lines on each pass
    #[arg(long)]
    pub closing_lines: bool,
}

impl SettleArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let ledger = Ledger::open(config).await?;

        let Some(secs) = self.interval_secs else {
            let summary = ledger.orchestrator.resolve_outcomes(Utc::now()).await;
            if self.closing_lines {
                let capture = ledger
                    .orchestrator
                    .capture_due_closing_lines(Utc::now())
                    .await;
                print_json(&capture)?;
            }
            ledger.save().await?;
            return print_json(&summary);
        };

        tracing::info!(interval_secs = secs, "Starting settlement loop");
        let mut state = RunState::new();
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(secs.max(1)));

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if self.closing_lines {
                        ledger.orchestrator.capture_due_closing_lines(Utc::now()).await;
                    }
                    if let Some(summary) = ledger.orchestrator.run_tracked(&mut state, Utc::now()).await {
                        for err in &summary.errors {
                            tracing::warn!(error = %err, "Settlement error");
                        }
                    }
                    if let Err(e) = ledger.save().await {
                        tracing::error!(error = %e, "Failed to save ledger");
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!(total_runs = state.total_runs, "Stopping settlement loop");
                    break;
                }
            }
        }

        ledger.save().await
    }
}

#[derive(Args, Debug)]
pub struct SettleBetArgs {
    pub bet_id: Uuid,

    /// won, lost or push
    #[arg(short, long)]
    pub status: BetStatus,

    /// Payout to record instead of the default for the status
    #[arg(short, long)]
    pub payout: Option<Decimal>,
}

impl SettleBetArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let ledger = Ledger::open(config).await?;
        let bet = ledger
            .orchestrator
            .settle_bet_manually(self.bet_id, self.status, self.payout, Utc::now())
            .await?;
        ledger.save().await?;
        print_json(&bet)
    }
}

#[derive(Args, Debug)]
pub struct SettleFutureArgs {
    pub future_id: Uuid,

    /// won, lost or push
    #[arg(short, long)]
    pub status: BetStatus,
}

impl SettleFutureArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let ledger = Ledger::open(config).await?;
        let settled = ledger
            .orchestrator
            .settle_future_leg(self.future_id, self.status, Utc::now())
            .await?;
        ledger.save().await?;

        match settled {
            Some(bet) => print_json(&bet),
            None => {
                println!("Future {} settled, bet still open", self.future_id);
                Ok(())
            }
        }
    }
}
