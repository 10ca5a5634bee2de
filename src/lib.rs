//! betledger: Sports wager tracker with a settlement engine
//!
//! This library provides the core components for:
//! - Odds conversion, parlay and teaser pricing
//! - Bet placement with validation and same-game grouping
//! - Leg and bet settlement against final scores
//! - Closing line capture and CLV reporting
//! - A JSON-file ledger store
//! - Score and odds feeds from The Odds API
//! - Structured logging and Prometheus metrics

pub mod cli;
pub mod clv;
pub mod config;
pub mod feed;
pub mod odds;
pub mod orchestrator;
pub mod settlement;
pub mod store;
pub mod telemetry;
pub mod wager;
