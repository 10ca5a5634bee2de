//! Bet management commands

use super::{print_json, Ledger};
use crate::config::Config;
use crate::wager::{BetEdit, BetStatus, CreateBetInput};
use anyhow::Context;
use chrono::Utc;
use clap::Args;
use rust_decimal::Decimal;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Args, Debug)]
pub struct PlaceArgs {
    /// JSON file with the bet (user_id, bet_type, stake, legs, ...)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Override the owner in the file
    #[arg(short, long)]
    pub user: Option<String>,
}

impl PlaceArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let json = tokio::fs::read_to_string(&self.input)
            .await
            .with_context(|| format!("Failed to read {}", self.input.display()))?;
        let mut input: CreateBetInput =
            serde_json::from_str(&json).context("Invalid bet input")?;
        if let Some(ref user) = self.user {
            input.user_id = user.clone();
        }

        let ledger = Ledger::open(config).await?;
        let bet = ledger.orchestrator.create_bet(input, Utc::now()).await?;
        ledger.save().await?;

        print_json(&bet)
    }
}

#[derive(Args, Debug)]
pub struct EditArgs {
    pub bet_id: Uuid,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub stake: Option<Decimal>,

    #[arg(long)]
    pub notes: Option<String>,
}

impl EditArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let edit = BetEdit {
            name: self.name.clone(),
            stake: self.stake,
            notes: self.notes.clone(),
        };

        let ledger = Ledger::open(config).await?;
        let bet = ledger
            .orchestrator
            .update_bet(self.bet_id, edit, Utc::now())
            .await?;
        ledger.save().await?;

        print_json(&bet)
    }
}

#[derive(Args, Debug)]
pub struct CancelArgs {
    pub bet_id: Uuid,
}

impl CancelArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let ledger = Ledger::open(config).await?;
        ledger
            .orchestrator
            .cancel_bet(self.bet_id, Utc::now())
            .await?;
        ledger.save().await?;

        println!("Cancelled bet {}", self.bet_id);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct BetsArgs {
    #[arg(short, long)]
    pub user: String,

    /// Only bets with this status (pending, won, lost, push)
    #[arg(short, long)]
    pub status: Option<BetStatus>,
}

impl BetsArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let ledger = Ledger::open(config).await?;
        let bets = ledger
            .orchestrator
            .list_bets(&self.user, self.status)
            .await?;
        print_json(&bets)
    }
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    #[arg(short, long)]
    pub user: String,
}

impl StatsArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let ledger = Ledger::open(config).await?;
        let stats = ledger.orchestrator.bet_stats(&self.user).await?;
        print_json(&stats)
    }
}
