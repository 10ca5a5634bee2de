//! CLI interface for betledger
//!
//! Provides subcommands for:
//! - `place`, `edit`, `cancel`: Manage bets
//! - `bets`, `stats`: Show a user's bets and record
//! - `settle`: Settle finished games, once or on an interval
//! - `settle-bet`, `settle-future`: Operator overrides
//! - `close-lines`, `clv`: Closing line capture and CLV report
//! - `sync-games`, `import`: Load games and odds snapshots
//! - `status`: Show ledger state
//! - `config`: Show configuration

mod bets;
mod clv;
mod games;
mod ledger;
mod settle;

pub use bets::{BetsArgs, CancelArgs, EditArgs, PlaceArgs, StatsArgs};
pub use clv::{CloseLinesArgs, ClvArgs};
pub use games::{ImportArgs, SyncGamesArgs};
pub use ledger::Ledger;
pub use settle::{SettleArgs, SettleBetArgs, SettleFutureArgs};

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "betledger")]
#[command(about = "Sports wager tracker with automatic settlement and CLV analysis")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Place a bet from a JSON file
    Place(PlaceArgs),
    /// Edit a pending bet
    Edit(EditArgs),
    /// Cancel a pending bet
    Cancel(CancelArgs),
    /// List a user's bets
    Bets(BetsArgs),
    /// Show a user's betting record
    Stats(StatsArgs),
    /// Settle finished games
    Settle(SettleArgs),
    /// Settle one bet by hand
    SettleBet(SettleBetArgs),
    /// Settle a futures selection by hand
    SettleFuture(SettleFutureArgs),
    /// Capture closing lines for games about to start
    CloseLines(CloseLinesArgs),
    /// Show a user's CLV report
    Clv(ClvArgs),
    /// Fetch upcoming games from The Odds API
    SyncGames(SyncGamesArgs),
    /// Import games or odds snapshots from JSON
    Import(ImportArgs),
    /// Show ledger state
    Status,
    /// Show configuration
    Config,
}

/// Print a value as pretty JSON
pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
