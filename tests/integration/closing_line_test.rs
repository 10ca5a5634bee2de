//! Closing line capture and CLV reporting

use crate::common::{bet_input, game, harness, harness_with_snapshots, leg};
use async_trait::async_trait;
use betledger::clv::ClvFilters;
use betledger::feed::{OddsQuote, OddsSnapshotSource};
use betledger::odds::{MarketType, Selection, Sport};
use betledger::orchestrator::BatchScope;
use betledger::store::{BetStore, Game, MemoryStore};
use betledger::wager::{BetType, ClvCategory};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Store-backed snapshots whose total lookups fail while `down` is set
struct FlakyTotals {
    store: MemoryStore,
    down: AtomicBool,
}

#[async_trait]
impl OddsSnapshotSource for FlakyTotals {
    async fn find_odds_snapshots(
        &self,
        game: &Game,
        market: MarketType,
        selection: Selection,
        line: Option<Decimal>,
    ) -> anyhow::Result<Vec<OddsQuote>> {
        if market == MarketType::Total && self.down.load(Ordering::SeqCst) {
            anyhow::bail!("totals feed unavailable");
        }
        self.store
            .find_odds_snapshots(game, market, selection, line)
            .await
    }
}

fn quote(
    game_id: &str,
    market: MarketType,
    selection: Selection,
    line: Option<Decimal>,
    price: Decimal,
    at: DateTime<Utc>,
) -> OddsQuote {
    OddsQuote {
        game_id: game_id.to_string(),
        bookmaker: "pinnacle".to_string(),
        market,
        selection,
        line,
        price,
        timestamp: at,
    }
}

#[tokio::test]
async fn test_capture_scores_clv() {
    let h = harness();
    let now = Utc::now();
    h.store.upsert_game(game("g1", Sport::Nfl, now + Duration::minutes(10))).await;

    let bet = h
        .orchestrator
        .create_bet(
            bet_input(
                BetType::Single,
                dec!(100),
                vec![leg("g1", MarketType::Moneyline, Selection::Home, None, -110)],
            ),
            now - Duration::days(2),
        )
        .await
        .unwrap();
    let leg_id = bet.legs[0].id;

    h.store
        .record_quote(quote(
            "g1",
            MarketType::Moneyline,
            Selection::Home,
            None,
            dec!(-120),
            now - Duration::hours(3),
        ))
        .await;
    h.store
        .record_quote(quote(
            "g1",
            MarketType::Moneyline,
            Selection::Home,
            None,
            dec!(-130),
            now - Duration::minutes(1),
        ))
        .await;

    let summary = h.orchestrator.capture_due_closing_lines(now).await;
    assert_eq!(summary.games_checked, 1);
    assert_eq!(summary.legs_captured, 1);
    assert_eq!(summary.legs_unmatched, 0);
    assert_eq!(summary.clv_calculated, 1);
    assert!(summary.errors.is_empty());

    let stored = h.store.get_leg(leg_id).await.unwrap().unwrap();
    assert_eq!(stored.closing_odds, Some(-130));
    assert_eq!(stored.clv, Some(dec!(7.91)));
    assert_eq!(stored.clv_category, Some(ClvCategory::Positive));

    // Already captured legs are skipped on the next pass
    let again = h.orchestrator.capture_due_closing_lines(now).await;
    assert_eq!(again.legs_captured, 0);
    assert_eq!(again.legs_unmatched, 0);

    let report = h
        .orchestrator
        .generate_clv_report("alice", &ClvFilters::default())
        .await
        .unwrap();
    assert_eq!(report.overall.count, 1);
    assert_eq!(report.overall.positive, 1);
    assert_eq!(report.overall.mean_clv, Some(dec!(7.91)));
    assert!(report.overall.clv_win_rate.is_none());
    assert_eq!(report.by_sport["nfl"].count, 1);
    assert_eq!(report.by_bookmaker["draftkings"].count, 1);
}

#[tokio::test]
async fn test_unmatched_line_is_reported() {
    let h = harness();
    let now = Utc::now();
    h.store.upsert_game(game("g1", Sport::Nba, now + Duration::minutes(5))).await;

    let bet = h
        .orchestrator
        .create_bet(
            bet_input(
                BetType::Single,
                dec!(50),
                vec![leg("g1", MarketType::Spread, Selection::Home, Some(dec!(-4.5)), -110)],
            ),
            now - Duration::hours(6),
        )
        .await
        .unwrap();

    h.store
        .record_quote(quote(
            "g1",
            MarketType::Spread,
            Selection::Home,
            Some(dec!(-6)),
            dec!(-110),
            now - Duration::minutes(2),
        ))
        .await;

    let summary = h.orchestrator.capture_due_closing_lines(now).await;
    assert_eq!(summary.legs_captured, 0);
    assert_eq!(summary.legs_unmatched, 1);
    assert_eq!(summary.clv_calculated, 0);

    let stored = h.store.get_leg(bet.legs[0].id).await.unwrap().unwrap();
    assert!(stored.closing_odds.is_none());
    assert_eq!(h.orchestrator.calculate_clv(stored.id).await.unwrap(), None);

    let report = h
        .orchestrator
        .generate_clv_report("alice", &ClvFilters::default())
        .await
        .unwrap();
    assert_eq!(report.overall.count, 0);
    assert!(report.overall.mean_clv.is_none());
}

#[tokio::test]
async fn test_games_outside_horizon_are_skipped() {
    let h = harness();
    let now = Utc::now();
    h.store.upsert_game(game("later", Sport::Mlb, now + Duration::hours(2))).await;

    h.orchestrator
        .create_bet(
            bet_input(
                BetType::Single,
                dec!(25),
                vec![leg("later", MarketType::Moneyline, Selection::Away, None, 140)],
            ),
            now,
        )
        .await
        .unwrap();
    h.store
        .record_quote(quote(
            "later",
            MarketType::Moneyline,
            Selection::Away,
            None,
            dec!(125),
            now,
        ))
        .await;

    let summary = h.orchestrator.capture_due_closing_lines(now).await;
    assert_eq!(summary.games_checked, 0);
    assert_eq!(summary.legs_captured, 0);
}

#[tokio::test]
async fn test_report_filters_by_sport() {
    let h = harness();
    let now = Utc::now();
    h.store.upsert_game(game("nfl", Sport::Nfl, now + Duration::minutes(10))).await;
    h.store.upsert_game(game("nba", Sport::Nba, now + Duration::minutes(10))).await;

    for (id, price) in [("nfl", dec!(-130)), ("nba", dec!(-100))] {
        h.orchestrator
            .create_bet(
                bet_input(
                    BetType::Single,
                    dec!(10),
                    vec![leg(id, MarketType::Moneyline, Selection::Home, None, -110)],
                ),
                now - Duration::days(1),
            )
            .await
            .unwrap();
        h.store
            .record_quote(quote(
                id,
                MarketType::Moneyline,
                Selection::Home,
                None,
                price,
                now,
            ))
            .await;
    }

    let summary = h.orchestrator.capture_due_closing_lines(now).await;
    assert_eq!(summary.clv_calculated, 2);

    let nba_only = ClvFilters {
        sport: Some(Sport::Nba),
        ..Default::default()
    };
    let report = h
        .orchestrator
        .generate_clv_report("alice", &nba_only)
        .await
        .unwrap();
    assert_eq!(report.overall.count, 1);
    assert_eq!(report.overall.negative, 1);
    assert!(report.by_sport.get("nfl").is_none());
}

#[tokio::test]
async fn test_failed_lookup_only_affects_its_market() {
    let store = MemoryStore::new();
    let source = Arc::new(FlakyTotals {
        store: store.clone(),
        down: AtomicBool::new(true),
    });
    let h = harness_with_snapshots(store, source.clone());
    let now = Utc::now();
    h.store.upsert_game(game("g1", Sport::Nfl, now + Duration::minutes(10))).await;

    let bet = h
        .orchestrator
        .create_bet(
            bet_input(
                BetType::Parlay,
                dec!(20),
                vec![
                    leg("g1", MarketType::Moneyline, Selection::Home, None, -110),
                    leg("g1", MarketType::Total, Selection::Over, Some(dec!(44.5)), -110),
                ],
            ),
            now - Duration::days(1),
        )
        .await
        .unwrap();
    let (ml, total) = (bet.legs[0].id, bet.legs[1].id);

    h.store
        .record_quote(quote(
            "g1",
            MarketType::Moneyline,
            Selection::Home,
            None,
            dec!(-130),
            now,
        ))
        .await;
    h.store
        .record_quote(quote(
            "g1",
            MarketType::Total,
            Selection::Over,
            Some(dec!(44.5)),
            dec!(-120),
            now,
        ))
        .await;

    let first = h.orchestrator.capture_due_closing_lines(now).await;
    assert_eq!(first.legs_captured, 1);
    assert_eq!(first.clv_calculated, 1);
    assert_eq!(first.errors.len(), 1);
    assert_eq!(first.errors[0].scope, BatchScope::Capture);
    assert_eq!(first.errors[0].id, total.to_string());

    let stored = h.store.get_leg(ml).await.unwrap().unwrap();
    assert_eq!(stored.closing_odds, Some(-130));
    assert_eq!(stored.clv, Some(dec!(7.91)));
    assert!(h.store.get_leg(total).await.unwrap().unwrap().closing_odds.is_none());

    source.down.store(false, Ordering::SeqCst);
    let second = h.orchestrator.capture_due_closing_lines(now).await;
    assert_eq!(second.legs_captured, 1);
    assert_eq!(second.clv_calculated, 1);
    assert!(second.errors.is_empty());

    let stored = h.store.get_leg(total).await.unwrap().unwrap();
    assert_eq!(stored.closing_odds, Some(-120));
    assert!(stored.clv.is_some());
}

#[tokio::test]
async fn test_captured_leg_without_clv_is_scored_next_pass() {
    let h = harness();
    let now = Utc::now();
    h.store.upsert_game(game("g1", Sport::Nba, now + Duration::minutes(10))).await;

    let bet = h
        .orchestrator
        .create_bet(
            bet_input(
                BetType::Single,
                dec!(10),
                vec![leg("g1", MarketType::Moneyline, Selection::Away, None, 120)],
            ),
            now - Duration::hours(5),
        )
        .await
        .unwrap();
    let leg_id = bet.legs[0].id;

    // Closing odds written by a pass that stopped before scoring
    h.store.update_leg_closing_odds(leg_id, 110).await.unwrap();

    let summary = h.orchestrator.capture_due_closing_lines(now).await;
    assert_eq!(summary.legs_captured, 0);
    assert_eq!(summary.legs_unmatched, 0);
    assert_eq!(summary.clv_calculated, 1);

    let stored = h.store.get_leg(leg_id).await.unwrap().unwrap();
    assert_eq!(stored.closing_odds, Some(110));
    assert_eq!(stored.clv_category, Some(ClvCategory::Positive));

    let again = h.orchestrator.capture_due_closing_lines(now).await;
    assert_eq!(again.clv_calculated, 0);
}
