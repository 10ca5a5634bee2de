//! The Odds API client
//!
//! Scores come from `/v4/sports/{sport}/scores`, odds snapshots from the
//! per-event odds endpoint, upcoming games from `/v4/sports/{sport}/events`.
//! Response parsing is kept in free functions so it can be tested without
//! the network.

use super::{GameResult, OddsQuote, OddsSnapshotSource, ScoreProvider};
use crate::odds::{MarketType, Selection, Sport};
use crate::store::{Game, GameStatus};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

/// The Odds API base URL
pub const ODDS_API_URL: &str = "https://api.the-odds-api.com";

/// Scores endpoint looks back at most this many days
const SCORES_DAYS_FROM: u32 = 3;

/// Configuration for The Odds API client
#[derive(Debug, Clone)]
pub struct TheOddsApiConfig {
    pub base_url: String,
    pub api_key: String,
    /// Bookmaker regions, e.g. "us"
    pub regions: String,
    pub timeout: Duration,
}

impl TheOddsApiConfig {
    /// Default configuration for an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: ODDS_API_URL.to_string(),
            api_key: api_key.into(),
            regions: "us".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Client for The Odds API v4
pub struct TheOddsApiClient {
    config: TheOddsApiConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
pub struct EventSummary {
    pub id: String,
    pub commence_time: DateTime<Utc>,
    pub home_team: String,
    pub away_team: String,
}

#[derive(Debug, Deserialize)]
pub struct ScoreEvent {
    pub id: String,
    #[serde(default)]
    pub completed: bool,
    pub home_team: String,
    pub away_team: String,
    #[serde(default)]
    pub scores: Option<Vec<TeamScore>>,
}

#[derive(Debug, Deserialize)]
pub struct TeamScore {
    pub name: String,
    pub score: String,
}

#[derive(Debug, Deserialize)]
pub struct EventOdds {
    pub id: String,
    #[serde(default)]
    pub bookmakers: Vec<EventBookmaker>,
}

#[derive(Debug, Deserialize)]
pub struct EventBookmaker {
    pub title: String,
    pub last_update: DateTime<Utc>,
    pub markets: Vec<EventMarket>,
}

#[derive(Debug, Deserialize)]
pub struct EventMarket {
    pub key: String,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
    pub outcomes: Vec<EventOutcome>,
}

#[derive(Debug, Deserialize)]
pub struct EventOutcome {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub point: Option<f64>,
}

impl TheOddsApiClient {
    /// Create a client with the given configuration
    pub fn new(config: TheOddsApiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            config: TheOddsApiConfig {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                ..config
            },
            client,
        })
    }

    async fn get(&self, url: &str, query: &[(&str, &str)]) -> anyhow::Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .query(&[("apiKey", self.config.api_key.as_str())])
            .query(query)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        if let Some(remaining) = response
            .headers()
            .get("x-requests-remaining")
            .and_then(|v| v.to_str().ok())
        {
            tracing::debug!(remaining, "Odds API quota");
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Odds API error: {} - {}", status, body);
        }

        Ok(response)
    }

    /// Upcoming events for a sport, as scheduled games
    pub async fn fetch_events(&self, sport: Sport) -> anyhow::Result<Vec<Game>> {
        let url = format!("{}/v4/sports/{}/events", self.config.base_url, sport.api_key());

        let events: Vec<EventSummary> = self
            .get(&url, &[])
            .await?
            .json()
            .await
            .context("Failed to parse events response")?;

        tracing::debug!(sport = %sport, count = events.len(), "Fetched events");
        Ok(parse_events(&events, sport))
    }
}

#[async_trait]
impl ScoreProvider for TheOddsApiClient {
    async fn fetch_final_score(&self, game: &Game) -> anyhow::Result<GameResult> {
        let url = format!(
            "{}/v4/sports/{}/scores",
            self.config.base_url,
            game.sport.api_key()
        );
        let days_from = SCORES_DAYS_FROM.to_string();

        tracing::debug!(game_id = %game.id, "Fetching scores");

        let events: Vec<ScoreEvent> = self
            .get(&url, &[("daysFrom", days_from.as_str())])
            .await?
            .json()
            .await
            .context("Failed to parse scores response")?;

        parse_scores(&events, game)
    }
}

#[async_trait]
impl OddsSnapshotSource for TheOddsApiClient {
    async fn find_odds_snapshots(
        &self,
        game: &Game,
        market: MarketType,
        selection: Selection,
        _line: Option<Decimal>,
    ) -> anyhow::Result<Vec<OddsQuote>> {
        let url = format!(
            "{}/v4/sports/{}/events/{}/odds",
            self.config.base_url,
            game.sport.api_key(),
            game.id
        );

        let event: EventOdds = self
            .get(
                &url,
                &[
                    ("regions", self.config.regions.as_str()),
                    ("markets", market.quote_key()),
                    ("oddsFormat", "american"),
                ],
            )
            .await?
            .json()
            .await
            .context("Failed to parse event odds response")?;

        Ok(parse_event_odds(&event, game)
            .into_iter()
            .filter(|q| q.market == market && q.selection == selection)
            .collect())
    }
}

/// Convert an events response into scheduled games
pub fn parse_events(events: &[EventSummary], sport: Sport) -> Vec<Game> {
    events
        .iter()
        .map(|e| Game {
            id: e.id.clone(),
            sport,
            home_team: e.home_team.clone(),
            away_team: e.away_team.clone(),
            start_time: e.commence_time,
            status: GameStatus::Scheduled,
            home_score: None,
            away_score: None,
        })
        .collect()
}

/// Extract one game's score from a scores response
pub fn parse_scores(events: &[ScoreEvent], game: &Game) -> anyhow::Result<GameResult> {
    let event = events
        .iter()
        .find(|e| e.id == game.id)
        .ok_or_else(|| anyhow::anyhow!("Game {} not in scores response", game.id))?;

    // A completed game must report both teams; in-progress gaps read as 0
    let score_for = |team: &str| -> anyhow::Result<u32> {
        let found = event
            .scores
            .as_deref()
            .and_then(|scores| scores.iter().find(|s| s.name == team));
        match found {
            Some(s) => s
                .score
                .trim()
                .parse::<u32>()
                .with_context(|| format!("Bad score '{}' for {}", s.score, team)),
            None if event.completed => {
                anyhow::bail!("Game {} completed without a score for {}", game.id, team)
            }
            None => Ok(0),
        }
    };

    let home_score = score_for(&event.home_team)?;
    let away_score = score_for(&event.away_team)?;

    Ok(GameResult {
        home_score,
        away_score,
        completed: event.completed,
    })
}

/// Flatten an event odds response into quotes
///
/// Spread points are reported per team; away points are negated so every
/// spread line is the home team's handicap.
pub fn parse_event_odds(event: &EventOdds, game: &Game) -> Vec<OddsQuote> {
    let mut quotes = Vec::new();

    for bookmaker in &event.bookmakers {
        for market in &bookmaker.markets {
            let Some(market_type) = MarketType::from_quote_key(&market.key) else {
                continue;
            };
            let timestamp = market.last_update.unwrap_or(bookmaker.last_update);

            for outcome in &market.outcomes {
                let selection = if outcome.name == game.home_team {
                    Selection::Home
                } else if outcome.name == game.away_team {
                    Selection::Away
                } else if outcome.name.eq_ignore_ascii_case("over") {
                    Selection::Over
                } else if outcome.name.eq_ignore_ascii_case("under") {
                    Selection::Under
                } else {
                    continue;
                };

                let Some(price) = Decimal::from_f64(outcome.price) else {
                    continue;
                };

                let line = outcome.point.and_then(Decimal::from_f64).map(|p| {
                    if market_type == MarketType::Spread && selection == Selection::Away {
                        -p
                    } else {
                        p
                    }
                });

                quotes.push(OddsQuote {
                    game_id: event.id.clone(),
                    bookmaker: bookmaker.title.clone(),
                    market: market_type,
                    selection,
                    line,
                    price,
                    timestamp,
                });
            }
        }
    }

    quotes
}
