//! Placing, editing and cancelling bets

use crate::common::{bet_input, game, harness, leg};
use betledger::odds::{MarketType, OddsError, Selection, Sport};
use betledger::store::BetStore;
use betledger::wager::{BetEdit, BetStatus, BetType, FutureInput, WagerError};
use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn test_unknown_games_are_rejected() {
    let h = harness();
    let now = Utc::now();
    h.store.upsert_game(game("g1", Sport::Nfl, now + Duration::hours(1))).await;

    let err = h
        .orchestrator
        .create_bet(
            bet_input(
                BetType::Parlay,
                dec!(10),
                vec![
                    leg("zz", MarketType::Moneyline, Selection::Home, None, -110),
                    leg("g1", MarketType::Moneyline, Selection::Home, None, -110),
                    leg("aa", MarketType::Moneyline, Selection::Away, None, 105),
                ],
            ),
            now,
        )
        .await
        .unwrap_err();
    match err {
        WagerError::GameNotFound(ids) => assert_eq!(ids, vec!["aa", "zz"]),
        other => panic!("unexpected error: {other}"),
    }
    assert!(h.orchestrator.list_bets("alice", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_started_games_are_rejected() {
    let h = harness();
    let now = Utc::now();
    h.store.upsert_game(game("live", Sport::Nba, now - Duration::minutes(1))).await;

    let err = h
        .orchestrator
        .create_bet(
            bet_input(
                BetType::Single,
                dec!(10),
                vec![leg("live", MarketType::Moneyline, Selection::Home, None, -110)],
            ),
            now,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WagerError::GameAlreadyStartedOrFinished(ids) if ids == vec!["live"]));
}

#[tokio::test]
async fn test_shape_errors_come_before_game_lookup() {
    let h = harness();
    let now = Utc::now();

    let err = h
        .orchestrator
        .create_bet(bet_input(BetType::Single, dec!(10), vec![]), now)
        .await
        .unwrap_err();
    assert!(matches!(err, WagerError::EmptyLegs));

    let err = h
        .orchestrator
        .create_bet(
            bet_input(
                BetType::Single,
                dec!(0),
                vec![leg("missing", MarketType::Moneyline, Selection::Home, None, -110)],
            ),
            now,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WagerError::NonPositiveStake(_)));

    let mut teaser = bet_input(
        BetType::Teaser,
        dec!(10),
        vec![
            leg("missing", MarketType::Spread, Selection::Home, Some(dec!(-3)), -110),
            leg("missing", MarketType::Moneyline, Selection::Home, None, -110),
        ],
    );
    teaser.teaser_points = Some(dec!(6));
    teaser.teaser_sport = Some(Sport::Nfl);
    let err = h.orchestrator.create_bet(teaser, now).await.unwrap_err();
    assert!(matches!(err, WagerError::TeaserForbidsMoneyline));
}

#[tokio::test]
async fn test_unpriced_teaser_is_rejected() {
    let h = harness();
    let now = Utc::now();
    h.store.upsert_game(game("g1", Sport::Nba, now + Duration::hours(1))).await;
    h.store.upsert_game(game("g2", Sport::Nba, now + Duration::hours(1))).await;

    let mut input = bet_input(
        BetType::Teaser,
        dec!(10),
        vec![
            leg("g1", MarketType::Spread, Selection::Home, Some(dec!(-3)), -110),
            leg("g2", MarketType::Total, Selection::Over, Some(dec!(220)), -110),
        ],
    );
    input.teaser_points = Some(dec!(11));
    input.teaser_sport = Some(Sport::Nba);
    let err = h.orchestrator.create_bet(input, now).await.unwrap_err();
    assert!(matches!(err, WagerError::InvalidTeaserConfiguration { .. }));
}

#[tokio::test]
async fn test_oversized_parlay_is_rejected() {
    let h = harness();
    let now = Utc::now();
    let mut legs = Vec::new();
    for i in 0..12 {
        let id = format!("g{i}");
        h.store.upsert_game(game(&id, Sport::Mlb, now + Duration::hours(1))).await;
        legs.push(leg(&id, MarketType::Moneyline, Selection::Away, None, 100000));
    }

    let err = assert_err!(
        h.orchestrator
            .create_bet(bet_input(BetType::Parlay, dec!(5), legs), now)
            .await
    );
    assert!(matches!(err, WagerError::Odds(OddsError::PayoutOverflow)));
    assert!(h.orchestrator.list_bets("alice", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_edit_reprices_until_kickoff() {
    let h = harness();
    let now = Utc::now();
    h.store.upsert_game(game("g1", Sport::Nfl, now + Duration::hours(1))).await;

    let bet = h
        .orchestrator
        .create_bet(
            bet_input(
                BetType::Single,
                dec!(100),
                vec![leg("g1", MarketType::Moneyline, Selection::Away, None, 150)],
            ),
            now,
        )
        .await
        .unwrap();
    assert_eq!(bet.potential_payout, dec!(250));

    let edited = h
        .orchestrator
        .update_bet(
            bet.id,
            BetEdit {
                stake: Some(dec!(40)),
                notes: Some("line moved".to_string()),
                ..Default::default()
            },
            now,
        )
        .await
        .unwrap();
    assert_eq!(edited.stake, dec!(40));
    assert_eq!(edited.potential_payout, dec!(100));
    assert_eq!(edited.notes.as_deref(), Some("line moved"));

    let err = h
        .orchestrator
        .update_bet(
            bet.id,
            BetEdit {
                stake: Some(dec!(-5)),
                ..Default::default()
            },
            now,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WagerError::NonPositiveStake(_)));

    let err = h
        .orchestrator
        .update_bet(bet.id, BetEdit::default(), now + Duration::hours(2))
        .await
        .unwrap_err();
    assert!(matches!(err, WagerError::GameAlreadyStarted(id) if id == "g1"));
}

#[tokio::test]
async fn test_cancel_guards() {
    let h = harness();
    let now = Utc::now();
    h.store.upsert_game(game("g1", Sport::Nhl, now + Duration::hours(1))).await;

    let place = || {
        bet_input(
            BetType::Single,
            dec!(10),
            vec![leg("g1", MarketType::Total, Selection::Over, Some(dec!(6)), -115)],
        )
    };
    let kept = h.orchestrator.create_bet(place(), now).await.unwrap();
    let dropped = h.orchestrator.create_bet(place(), now).await.unwrap();

    assert_ok!(h.orchestrator.cancel_bet(dropped.id, now).await);
    assert!(h.store.get_bet(dropped.id).await.unwrap().is_none());

    let err = assert_err!(h.orchestrator.cancel_bet(dropped.id, now).await);
    assert!(matches!(err, WagerError::BetNotFound(_)));

    let err = h
        .orchestrator
        .cancel_bet(kept.id, now + Duration::hours(1))
        .await
        .unwrap_err();
    assert!(matches!(err, WagerError::GameAlreadyStarted(_)));

    h.orchestrator
        .settle_bet_manually(kept.id, BetStatus::Lost, None, now)
        .await
        .unwrap();
    let err = h.orchestrator.cancel_bet(kept.id, now).await.unwrap_err();
    assert!(matches!(err, WagerError::AlreadySettled(_)));
}

#[tokio::test]
async fn test_manual_settlement() {
    let h = harness();
    let now = Utc::now();
    h.store.upsert_game(game("g1", Sport::Mlb, now + Duration::hours(1))).await;

    let bet = h
        .orchestrator
        .create_bet(
            bet_input(
                BetType::Single,
                dec!(30),
                vec![leg("g1", MarketType::Moneyline, Selection::Home, None, -150)],
            ),
            now,
        )
        .await
        .unwrap();

    let err = h
        .orchestrator
        .settle_bet_manually(bet.id, BetStatus::Pending, None, now)
        .await
        .unwrap_err();
    assert!(matches!(err, WagerError::InvalidSettlementStatus(_)));

    let settled = h
        .orchestrator
        .settle_bet_manually(bet.id, BetStatus::Won, None, now)
        .await
        .unwrap();
    assert_eq!(settled.actual_payout, Some(dec!(50)));
    assert_eq!(settled.settled_at, Some(now));

    let err = h
        .orchestrator
        .settle_bet_manually(bet.id, BetStatus::Push, Some(dec!(30)), now)
        .await
        .unwrap_err();
    assert!(matches!(err, WagerError::AlreadySettled(_)));
}

#[tokio::test]
async fn test_futures_settle_parent_bet() {
    let h = harness();
    let now = Utc::now();

    let mut input = bet_input(BetType::Single, dec!(20), vec![]);
    input.futures = vec![FutureInput {
        description: "Chiefs to win the Super Bowl".to_string(),
        odds: 500,
    }];
    let bet = h.orchestrator.create_bet(input, now).await.unwrap();
    assert_eq!(bet.potential_payout, dec!(120));
    assert_eq!(bet.name, "Chiefs to win the Super Bowl");
    let future_id = bet.futures[0].id;

    let settled = h
        .orchestrator
        .settle_future_leg(future_id, BetStatus::Won, now)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(settled.status, BetStatus::Won);
    assert_eq!(settled.actual_payout, Some(dec!(120)));

    let err = h
        .orchestrator
        .settle_future_leg(future_id, BetStatus::Lost, now)
        .await
        .unwrap_err();
    assert!(matches!(err, WagerError::AlreadySettled(id) if id == bet.id));
}

#[tokio::test]
async fn test_list_and_stats() {
    let h = harness();
    let now = Utc::now();
    h.store.upsert_game(game("g1", Sport::Nfl, now + Duration::hours(1))).await;

    let mut ids = Vec::new();
    for odds in [-110, 120, 200] {
        let bet = h
            .orchestrator
            .create_bet(
                bet_input(
                    BetType::Single,
                    dec!(100),
                    vec![leg("g1", MarketType::Moneyline, Selection::Home, None, odds)],
                ),
                now,
            )
            .await
            .unwrap();
        ids.push(bet.id);
    }

    h.orchestrator
        .settle_bet_manually(ids[1], BetStatus::Won, None, now)
        .await
        .unwrap();
    h.orchestrator
        .settle_bet_manually(ids[2], BetStatus::Lost, None, now)
        .await
        .unwrap();

    let pending = h
        .orchestrator
        .list_bets("alice", Some(BetStatus::Pending))
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, ids[0]);
    assert!(h.orchestrator.list_bets("bob", None).await.unwrap().is_empty());

    let stats = h.orchestrator.bet_stats("alice").await.unwrap();
    assert_eq!(stats.total_bets, 3);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.win_rate, Some(dec!(0.5)));
    assert_eq!(stats.total_staked, dec!(300));
    assert_eq!(stats.settled_staked, dec!(200));
    assert_eq!(stats.total_returned, dec!(220));
    assert_eq!(stats.net_profit, dec!(20));
    assert_eq!(stats.roi, Some(dec!(10)));
}
