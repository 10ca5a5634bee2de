//! Configuration types for betledger

use crate::telemetry::LogFormat;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settlement: SettlementConfig,
    #[serde(default)]
    pub clv: ClvConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Settlement batch configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SettlementConfig {
    /// Games starting within this many minutes get their closing line captured
    #[serde(default = "default_closing_line_horizon")]
    pub closing_line_horizon_minutes: i64,
}

fn default_closing_line_horizon() -> i64 {
    15
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            closing_line_horizon_minutes: 15,
        }
    }
}

/// Closing line value configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClvConfig {
    /// Max distance between a leg's line and a snapshot's line to match
    #[serde(default = "default_line_tolerance")]
    pub line_tolerance: Decimal,

    /// CLV (percent) above which a leg is positive
    #[serde(default = "default_positive_threshold")]
    pub positive_threshold: Decimal,

    /// CLV (percent) below which a leg is negative
    #[serde(default = "default_negative_threshold")]
    pub negative_threshold: Decimal,
}

fn default_line_tolerance() -> Decimal {
    Decimal::new(1, 1) // 0.1
}
fn default_positive_threshold() -> Decimal {
    Decimal::ONE
}
fn default_negative_threshold() -> Decimal {
    Decimal::NEGATIVE_ONE
}

impl Default for ClvConfig {
    fn default() -> Self {
        Self {
            line_tolerance: Decimal::new(1, 1),
            positive_threshold: Decimal::ONE,
            negative_threshold: Decimal::NEGATIVE_ONE,
        }
    }
}

/// Ledger file configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./data/ledger.json")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Score and odds feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Bookmaker regions to request odds for
    #[serde(default = "default_regions")]
    pub regions: String,
}

fn default_base_url() -> String {
    crate::feed::ODDS_API_URL.to_string()
}
fn default_api_key_env() -> String {
    "ODDS_API_KEY".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_regions() -> String {
    "us".to_string()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: 10,
            regions: default_regions(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    /// Prometheus scrape port, exporter disabled when unset
    pub metrics_port: Option<u16>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            metrics_port: None,
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
