use betledger::cli::{Cli, Commands, Ledger};
use betledger::config::Config;
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
            eprintln!("Using default configuration");
            toml::from_str(include_str!("../config.toml.example"))?
        }
    };

    // Initialize telemetry
    let _telemetry = betledger::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Place(args) => args.execute(&config).await?,
        Commands::Edit(args) => args.execute(&config).await?,
        Commands::Cancel(args) => args.execute(&config).await?,
        Commands::Bets(args) => args.execute(&config).await?,
        Commands::Stats(args) => args.execute(&config).await?,
        Commands::Settle(args) => {
            tracing::info!("Starting settlement");
            args.execute(&config).await?;
        }
        Commands::SettleBet(args) => args.execute(&config).await?,
        Commands::SettleFuture(args) => args.execute(&config).await?,
        Commands::CloseLines(args) => {
            tracing::info!("Capturing closing lines");
            args.execute(&config).await?;
        }
        Commands::Clv(args) => args.execute(&config).await?,
        Commands::SyncGames(args) => args.execute(&config).await?,
        Commands::Import(args) => args.execute(&config).await?,
        Commands::Status => {
            let ledger = Ledger::open(&config).await?;
            println!("betledger status");
            println!("  Ledger: {}", config.store.path.display());
            println!("  Pending bets: {}", ledger.store.pending_bet_count().await);
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Ledger: {}", config.store.path.display());
            println!(
                "  Feed: {} (key from ${}, regions {})",
                config.feed.base_url, config.feed.api_key_env, config.feed.regions
            );
            println!(
                "  Closing line horizon: {} min",
                config.settlement.closing_line_horizon_minutes
            );
            println!(
                "  CLV: tolerance={}, positive>{}, negative<{}",
                config.clv.line_tolerance,
                config.clv.positive_threshold,
                config.clv.negative_threshold
            );
            println!(
                "  Logging: {} ({:?})",
                config.telemetry.log_level, config.telemetry.log_format
            );
        }
    }

    Ok(())
}
