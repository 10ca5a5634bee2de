//! Settlement passes against a stub score feed

use crate::common::{bet_input, game, harness, leg};
use betledger::odds::{calculate_payout, MarketType, Selection, Sport};
use betledger::orchestrator::{BatchScope, RunState};
use betledger::store::{BetStore, GameStore};
use betledger::wager::{BetStatus, BetType};
use chrono::{Duration, Utc};
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_single_settles_once() {
    let h = harness();
    let now = Utc::now();
    h.store.upsert_game(game("g1", Sport::Nba, now + Duration::hours(1))).await;

    let bet = h
        .orchestrator
        .create_bet(
            bet_input(
                BetType::Single,
                dec!(100),
                vec![leg("g1", MarketType::Moneyline, Selection::Home, None, 150)],
            ),
            now,
        )
        .await
        .unwrap();

    h.scores.finish("g1", 112, 104);
    let later = now + Duration::hours(4);

    let first = h.orchestrator.resolve_outcomes(later).await;
    assert_eq!(first.games_checked, 1);
    assert_eq!(first.games_updated, 1);
    assert_eq!(first.legs_settled, 1);
    assert_eq!(first.bets_settled, 1);
    assert!(first.errors.is_empty());

    let settled = h.store.get_bet(bet.id).await.unwrap().unwrap();
    assert_eq!(settled.status, BetStatus::Won);
    assert_eq!(settled.actual_payout, Some(dec!(250)));
    assert_eq!(settled.settled_at, Some(later));

    let second = h.orchestrator.resolve_outcomes(later).await;
    assert_eq!(second.legs_settled, 0);
    assert_eq!(second.bets_settled, 0);

    let again = h.store.get_bet(bet.id).await.unwrap().unwrap();
    assert_eq!(again, settled);
}

#[tokio::test]
async fn test_parlay_with_push_pays_reduced() {
    let h = harness();
    let now = Utc::now();
    h.store.upsert_game(game("g1", Sport::Nfl, now + Duration::hours(1))).await;
    h.store.upsert_game(game("g2", Sport::Nfl, now + Duration::hours(1))).await;

    let bet = h
        .orchestrator
        .create_bet(
            bet_input(
                BetType::Parlay,
                dec!(100),
                vec![
                    leg("g1", MarketType::Moneyline, Selection::Home, None, -110),
                    leg("g2", MarketType::Spread, Selection::Home, Some(dec!(-3)), -110),
                ],
            ),
            now,
        )
        .await
        .unwrap();
    assert_eq!(bet.potential_payout, dec!(364.46));

    h.scores.finish("g1", 27, 17);
    h.scores.finish("g2", 23, 20);
    let summary = h.orchestrator.resolve_outcomes(now + Duration::hours(5)).await;
    assert_eq!(summary.legs_settled, 2);
    assert_eq!(summary.bets_settled, 1);

    let settled = h.store.get_bet(bet.id).await.unwrap().unwrap();
    assert_eq!(settled.status, BetStatus::Won);
    assert_eq!(
        settled.actual_payout,
        Some(calculate_payout(dec!(100), -110).unwrap())
    );
    assert_eq!(settled.legs[1].status, BetStatus::Push);
}

#[tokio::test]
async fn test_parlay_waits_for_every_game() {
    let h = harness();
    let now = Utc::now();
    h.store.upsert_game(game("early", Sport::Nfl, now + Duration::hours(1))).await;
    h.store.upsert_game(game("late", Sport::Nfl, now + Duration::hours(6))).await;

    let bet = h
        .orchestrator
        .create_bet(
            bet_input(
                BetType::Parlay,
                dec!(20),
                vec![
                    leg("early", MarketType::Total, Selection::Over, Some(dec!(44.5)), -110),
                    leg("late", MarketType::Moneyline, Selection::Away, None, 120),
                ],
            ),
            now,
        )
        .await
        .unwrap();

    h.scores.finish("early", 31, 24);
    let first = h.orchestrator.resolve_outcomes(now + Duration::hours(4)).await;
    assert_eq!(first.legs_settled, 1);
    assert_eq!(first.bets_settled, 0);
    assert!(h.store.get_bet(bet.id).await.unwrap().unwrap().is_pending());

    h.scores.finish("late", 10, 13);
    let second = h.orchestrator.resolve_outcomes(now + Duration::hours(10)).await;
    assert_eq!(second.legs_settled, 1);
    assert_eq!(second.bets_settled, 1);

    let settled = h.store.get_bet(bet.id).await.unwrap().unwrap();
    assert_eq!(settled.status, BetStatus::Won);
    assert_eq!(settled.actual_payout, Some(bet.potential_payout));
}

#[tokio::test]
async fn test_lost_leg_loses_parlay() {
    let h = harness();
    let now = Utc::now();
    h.store.upsert_game(game("g1", Sport::Nhl, now + Duration::hours(1))).await;

    let bet = h
        .orchestrator
        .create_bet(
            bet_input(
                BetType::Parlay,
                dec!(50),
                vec![
                    leg("g1", MarketType::Moneyline, Selection::Home, None, -150),
                    leg("g1", MarketType::Total, Selection::Under, Some(dec!(5.5)), 100),
                ],
            ),
            now,
        )
        .await
        .unwrap();
    assert!(bet.legs[0].sgp_group.is_some());

    h.scores.finish("g1", 4, 2);
    let summary = h.orchestrator.resolve_outcomes(now + Duration::hours(4)).await;
    assert_eq!(summary.bets_settled, 1);

    let settled = h.store.get_bet(bet.id).await.unwrap().unwrap();
    assert_eq!(settled.status, BetStatus::Lost);
    assert_eq!(settled.actual_payout, Some(dec!(0)));

    let stats = h.orchestrator.bet_stats("alice").await.unwrap();
    assert_eq!(stats.lost, 1);
    assert_eq!(stats.net_profit, dec!(-50));
}

#[tokio::test]
async fn test_teaser_settles_on_adjusted_lines() {
    let h = harness();
    let now = Utc::now();
    h.store.upsert_game(game("g1", Sport::Nfl, now + Duration::hours(1))).await;
    h.store.upsert_game(game("g2", Sport::Nfl, now + Duration::hours(1))).await;

    let mut input = bet_input(
        BetType::Teaser,
        dec!(110),
        vec![
            leg("g1", MarketType::Spread, Selection::Home, Some(dec!(-7.5)), -110),
            leg("g2", MarketType::Total, Selection::Under, Some(dec!(44)), -110),
        ],
    );
    input.teaser_points = Some(dec!(6));
    input.teaser_sport = Some(Sport::Nfl);
    let bet = h.orchestrator.create_bet(input, now).await.unwrap();
    assert_eq!(bet.potential_payout, dec!(210));

    // Home wins by 3: loses at -7.5, covers at -1.5
    h.scores.finish("g1", 24, 21);
    // 45 total: over 44, under the teased 50
    h.scores.finish("g2", 24, 21);
    h.orchestrator.resolve_outcomes(now + Duration::hours(4)).await;

    let settled = h.store.get_bet(bet.id).await.unwrap().unwrap();
    assert_eq!(settled.status, BetStatus::Won);
    assert_eq!(settled.actual_payout, Some(dec!(210)));
}

#[tokio::test]
async fn test_score_failure_is_isolated() {
    let h = harness();
    let now = Utc::now();
    h.store.upsert_game(game("ok", Sport::Mlb, now + Duration::hours(1))).await;
    h.store.upsert_game(game("down", Sport::Mlb, now + Duration::hours(1))).await;

    for id in ["ok", "down"] {
        h.orchestrator
            .create_bet(
                bet_input(
                    BetType::Single,
                    dec!(10),
                    vec![leg(id, MarketType::Moneyline, Selection::Away, None, 110)],
                ),
                now,
            )
            .await
            .unwrap();
    }

    h.scores.finish("ok", 3, 5);
    h.scores.fail("down");
    let summary = h.orchestrator.resolve_outcomes(now + Duration::hours(4)).await;

    assert_eq!(summary.games_checked, 2);
    assert_eq!(summary.bets_settled, 1);
    assert_eq!(summary.errors.len(), 1);
    assert_eq!(summary.errors[0].scope, BatchScope::Game);
    assert_eq!(summary.errors[0].id, "down");
}

#[tokio::test]
async fn test_interrupted_run_resumes_from_stored_score() {
    let h = harness();
    let now = Utc::now();
    h.store.upsert_game(game("g1", Sport::Nfl, now + Duration::hours(1))).await;

    let bet = h
        .orchestrator
        .create_bet(
            bet_input(
                BetType::Single,
                dec!(100),
                vec![leg("g1", MarketType::Spread, Selection::Away, Some(dec!(-2.5)), -110)],
            ),
            now,
        )
        .await
        .unwrap();

    // Score written by an earlier pass that stopped before touching legs
    h.store.record_final_score("g1", 20, 17).await.unwrap();

    let summary = h.orchestrator.resolve_outcomes(now + Duration::hours(4)).await;
    assert_eq!(h.scores.calls(), 0);
    assert_eq!(summary.games_updated, 0);
    assert_eq!(summary.legs_settled, 1);

    // Home wins by 3 with a -2.5 home handicap: home covers, away loses
    let settled = h.store.get_bet(bet.id).await.unwrap().unwrap();
    assert_eq!(settled.status, BetStatus::Lost);

    let rerun = h.orchestrator.resolve_outcomes(now + Duration::hours(5)).await;
    assert_eq!(rerun.games_checked, 0);
}

#[tokio::test]
async fn test_run_tracked_records_history() {
    let h = harness();
    let now = Utc::now();
    h.store.upsert_game(game("g1", Sport::Nba, now + Duration::hours(1))).await;
    h.orchestrator
        .create_bet(
            bet_input(
                BetType::Single,
                dec!(10),
                vec![leg("g1", MarketType::Moneyline, Selection::Home, None, -200)],
            ),
            now,
        )
        .await
        .unwrap();
    h.scores.finish("g1", 99, 99);

    let mut state = RunState::new();
    let summary = h
        .orchestrator
        .run_tracked(&mut state, now + Duration::hours(3))
        .await
        .unwrap();
    assert_eq!(summary.bets_settled, 1);
    assert_eq!(state.total_runs, 1);
    assert_eq!(state.last_result, Some(summary));
    assert!(!state.is_running);

    let bets = h
        .orchestrator
        .list_bets("alice", Some(BetStatus::Push))
        .await
        .unwrap();
    assert_eq!(bets.len(), 1);
    assert_eq!(bets[0].actual_payout, Some(dec!(10)));
}
