//! Shared fixtures

use async_trait::async_trait;
use betledger::config::{ClvConfig, SettlementConfig};
use betledger::feed::{GameResult, OddsSnapshotSource, ScoreProvider};
use betledger::odds::{MarketType, Selection, Sport};
use betledger::orchestrator::Orchestrator;
use betledger::store::{Game, GameStatus, MemoryStore};
use betledger::wager::{BetType, CreateBetInput, LegInput};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Score provider backed by a map, with failing games and a call counter
#[derive(Default)]
pub struct StubScores {
    results: Mutex<HashMap<String, GameResult>>,
    failing: Mutex<HashSet<String>>,
    calls: AtomicUsize,
}

impl StubScores {
    pub fn finish(&self, game_id: &str, home_score: u32, away_score: u32) {
        self.results.lock().unwrap().insert(
            game_id.to_string(),
            GameResult {
                home_score,
                away_score,
                completed: true,
            },
        );
    }

    pub fn fail(&self, game_id: &str) {
        self.failing.lock().unwrap().insert(game_id.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScoreProvider for StubScores {
    async fn fetch_final_score(&self, game: &Game) -> anyhow::Result<GameResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(&game.id) {
            anyhow::bail!("scores unavailable for {}", game.id);
        }
        Ok(self
            .results
            .lock()
            .unwrap()
            .get(&game.id)
            .copied()
            .unwrap_or(GameResult {
                home_score: 0,
                away_score: 0,
                completed: false,
            }))
    }
}

pub struct Harness {
    pub store: MemoryStore,
    pub scores: Arc<StubScores>,
    pub orchestrator: Orchestrator,
}

pub fn harness() -> Harness {
    let store = MemoryStore::new();
    harness_with_snapshots(store.clone(), Arc::new(store))
}

/// Harness reading odds snapshots from `snapshots` instead of the store
pub fn harness_with_snapshots(
    store: MemoryStore,
    snapshots: Arc<dyn OddsSnapshotSource>,
) -> Harness {
    let scores = Arc::new(StubScores::default());
    let shared = Arc::new(store.clone());
    let orchestrator = Orchestrator::new(
        shared.clone(),
        shared,
        scores.clone(),
        snapshots,
        SettlementConfig::default(),
        ClvConfig::default(),
    );
    Harness {
        store,
        scores,
        orchestrator,
    }
}

pub fn game(id: &str, sport: Sport, start: DateTime<Utc>) -> Game {
    Game {
        id: id.to_string(),
        sport,
        home_team: format!("{id} home"),
        away_team: format!("{id} away"),
        start_time: start,
        status: GameStatus::Scheduled,
        home_score: None,
        away_score: None,
    }
}

pub fn leg(
    game_id: &str,
    market: MarketType,
    selection: Selection,
    line: Option<Decimal>,
    odds: i32,
) -> LegInput {
    LegInput {
        game_id: game_id.to_string(),
        market,
        selection,
        line,
        odds,
        user_line: None,
        user_odds: None,
        bookmaker: Some("DraftKings".to_string()),
        team_name: None,
    }
}

pub fn bet_input(bet_type: BetType, stake: Decimal, legs: Vec<LegInput>) -> CreateBetInput {
    CreateBetInput {
        user_id: "alice".to_string(),
        name: None,
        bet_type,
        stake,
        legs,
        futures: vec![],
        teaser_points: None,
        teaser_sport: None,
        notes: None,
    }
}
