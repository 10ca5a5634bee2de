//! Closing line commands

use super::{print_json, Ledger};
use crate::clv::ClvFilters;
use crate::config::Config;
use crate::odds::Sport;
use chrono::{DateTime, Utc};
use clap::Args;

#[derive(Args, Debug)]
pub struct CloseLinesArgs {}

impl CloseLinesArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let ledger = Ledger::open(config).await?;
        let summary = ledger
            .orchestrator
            .capture_due_closing_lines(Utc::now())
            .await;
        ledger.save().await?;
        print_json(&summary)
    }
}

#[derive(Args, Debug)]
pub struct ClvArgs {
    #[arg(short, long)]
    pub user: String,

    #[arg(long)]
    pub sport: Option<Sport>,

    #[arg(long)]
    pub bookmaker: Option<String>,

    /// Placed at or after (RFC 3339)
    #[arg(long)]
    pub from: Option<DateTime<Utc>>,

    /// Placed before (RFC 3339)
    #[arg(long)]
    pub to: Option<DateTime<Utc>>,
}

impl ClvArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let filters = ClvFilters {
            sport: self.sport,
            bookmaker: self.bookmaker.clone(),
            from: self.from,
            to: self.to,
        };

        let ledger = Ledger::open(config).await?;
        let report = ledger
            .orchestrator
            .generate_clv_report(&self.user, &filters)
            .await?;
        print_json(&report)
    }
}
