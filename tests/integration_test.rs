mod helpers;

use betbook_backend::error::AppError;
use betbook_backend::models::*;
use betbook_backend::services::{MatchRef, ResultRequest};
use chrono::NaiveDate;
use helpers::*;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_create_bet_debits_every_account() {
    let db = TestDatabase::new().await;

    for id in 1..=4 {
        create_funded_account(&db, id, dec!(5000)).await;
    }

    // 2100 at 2.0 / 3.0 -> side stakes 1050 and 700
    let created = db
        .betting
        .create_bet(bet_request(
            vec![1, 2],
            vec![3, 4],
            dec!(2100),
            dec!(2.0),
            dec!(3.0),
        ))
        .await
        .unwrap();

    assert_eq!(created.stake1, dec!(1050));
    assert_eq!(created.stake2, dec!(700));
    assert_eq!(created.accounts.len(), 4);

    assert_eq!(balance_of(&db, 1).await, dec!(3950));
    assert_eq!(balance_of(&db, 2).await, dec!(3950));
    assert_eq!(balance_of(&db, 3).await, dec!(4300));
    assert_eq!(balance_of(&db, 4).await, dec!(4300));

    // Sum of debits per side equals allocation count x side stake
    let detail = db.betting.bet_detail(created.bet_id).await.unwrap();
    let side1_total: rust_decimal::Decimal =
        detail.side_accounts(Side::One).map(|a| a.bet_amount).sum();
    let side2_total: rust_decimal::Decimal =
        detail.side_accounts(Side::Two).map(|a| a.bet_amount).sum();
    assert_eq!(side1_total, dec!(2100));
    assert_eq!(side2_total, dec!(1400));

    let active = db.betting.list_active_bets().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].bet_id, created.bet_id);

    db.cleanup().await;
}

#[tokio::test]
async fn test_create_bet_with_supplied_stakes() {
    let db = TestDatabase::new().await;

    create_funded_account(&db, 1, dec!(5000)).await;
    create_funded_account(&db, 2, dec!(5000)).await;

    let mut request = bet_request(vec![1], vec![2], dec!(2100), dec!(2.0), dec!(3.0));
    request.stake1 = Some(dec!(999));
    request.stake2 = Some(dec!(111));

    let created = db.betting.create_bet(request).await.unwrap();
    assert_eq!(created.stake1, dec!(999));
    assert_eq!(created.stake2, dec!(111));
    assert_eq!(balance_of(&db, 1).await, dec!(4001));
    assert_eq!(balance_of(&db, 2).await, dec!(4889));

    db.cleanup().await;
}

#[tokio::test]
async fn test_create_bet_reuses_existing_match() {
    let db = TestDatabase::new().await;

    for id in 1..=2 {
        create_funded_account(&db, id, dec!(5000)).await;
    }

    let date = NaiveDate::from_ymd_opt(2025, 4, 12).unwrap();
    let m = db
        .betting
        .create_match("Delhi Capitals", "Punjab Kings", date, "3:30 PM")
        .await
        .unwrap();

    let mut request = bet_request(vec![1], vec![2], dec!(1000), dec!(2.0), dec!(2.0));
    request.match_ref = MatchRef::Existing(m.match_id);
    let first = db.betting.create_bet(request.clone()).await.unwrap();

    request.match_ref = MatchRef::Existing(m.match_id);
    let second = db.betting.create_bet(request).await.unwrap();

    assert_eq!(first.match_id, m.match_id);
    assert_eq!(second.match_id, m.match_id);
    assert_eq!(db.betting.list_active_bets().await.unwrap().len(), 2);

    db.cleanup().await;
}

#[tokio::test]
async fn test_create_bet_unknown_match_fails() {
    let db = TestDatabase::new().await;

    create_funded_account(&db, 1, dec!(5000)).await;
    create_funded_account(&db, 2, dec!(5000)).await;

    let mut request = bet_request(vec![1], vec![2], dec!(1000), dec!(2.0), dec!(2.0));
    request.match_ref = MatchRef::Existing(404);

    let err = db.betting.create_bet(request).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(balance_of(&db, 1).await, dec!(5000));

    db.cleanup().await;
}

#[tokio::test]
async fn test_missing_accounts_rejected() {
    let db = TestDatabase::new().await;

    create_funded_account(&db, 1, dec!(5000)).await;

    let err = db
        .betting
        .create_bet(bet_request(vec![], vec![1], dec!(1000), dec!(2.0), dec!(2.0)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::MissingAccounts(_)));

    let err = db
        .betting
        .create_bet(bet_request(vec![1], vec![], dec!(1000), dec!(2.0), dec!(2.0)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::MissingAccounts(_)));

    db.cleanup().await;
}

#[tokio::test]
async fn test_account_on_both_sides_rejected_without_writes() {
    let db = TestDatabase::new().await;

    create_funded_account(&db, 1, dec!(5000)).await;
    create_funded_account(&db, 2, dec!(5000)).await;
    create_funded_account(&db, 3, dec!(5000)).await;

    let err = db
        .betting
        .create_bet(bet_request(
            vec![1, 2],
            vec![2, 3],
            dec!(1000),
            dec!(2.0),
            dec!(2.0),
        ))
        .await
        .unwrap_err();

    match err {
        AppError::AccountOnBothSides(ids) => assert_eq!(ids, vec![2]),
        other => panic!("expected AccountOnBothSides, got {:?}", other),
    }

    // Zero writes happened
    assert!(db.betting.list_active_bets().await.unwrap().is_empty());
    for id in 1..=3 {
        assert_eq!(balance_of(&db, id).await, dec!(5000));
    }

    db.cleanup().await;
}

#[tokio::test]
async fn test_unbalanced_sides_policy() {
    let db = TestDatabase::new().await;

    for id in 1..=3 {
        create_funded_account(&db, id, dec!(5000)).await;
    }

    let err = db
        .betting
        .create_bet(bet_request(
            vec![1, 2],
            vec![3],
            dec!(1000),
            dec!(2.0),
            dec!(2.0),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UnbalancedSides { side1: 2, side2: 1 }));

    db.cleanup().await;
}

#[tokio::test]
async fn test_unbalanced_sides_allowed_when_policy_off() {
    let db = TestDatabase::with_policy(false).await;

    for id in 1..=3 {
        create_funded_account(&db, id, dec!(5000)).await;
    }

    let created = db
        .betting
        .create_bet(bet_request(
            vec![1, 2],
            vec![3],
            dec!(1000),
            dec!(2.0),
            dec!(2.0),
        ))
        .await
        .unwrap();

    assert_eq!(created.accounts.len(), 3);

    db.cleanup().await;
}

#[tokio::test]
async fn test_insufficient_balance_reports_every_shortfall() {
    let db = TestDatabase::new().await;

    create_funded_account(&db, 1, dec!(100)).await; // short on side 1
    create_funded_account(&db, 2, dec!(5000)).await;
    create_funded_account(&db, 3, dec!(5000)).await;
    create_funded_account(&db, 4, dec!(50)).await; // short on side 2

    let err = db
        .betting
        .create_bet(bet_request(
            vec![1, 2],
            vec![3, 4],
            dec!(2100),
            dec!(2.0),
            dec!(3.0),
        ))
        .await
        .unwrap_err();

    match err {
        AppError::InsufficientBalance(shortfalls) => {
            assert_eq!(shortfalls.len(), 2);
            assert_eq!(shortfalls[0].account_id, 1);
            assert_eq!(shortfalls[0].required, dec!(1050));
            assert_eq!(shortfalls[0].available, dec!(100));
            assert_eq!(shortfalls[1].account_id, 4);
            assert_eq!(shortfalls[1].required, dec!(700));
            assert_eq!(shortfalls[1].available, dec!(50));
        }
        other => panic!("expected InsufficientBalance, got {:?}", other),
    }

    // Nothing was written
    assert!(db.betting.list_active_bets().await.unwrap().is_empty());
    assert_eq!(balance_of(&db, 2).await, dec!(5000));

    db.cleanup().await;
}

#[tokio::test]
async fn test_settle_win_credits_winning_side_only() {
    let db = TestDatabase::new().await;

    for id in 1..=4 {
        create_funded_account(&db, id, dec!(5000)).await;
    }

    let created = db
        .betting
        .create_bet(bet_request(
            vec![1, 2],
            vec![3, 4],
            dec!(2100),
            dec!(2.0),
            dec!(3.0),
        ))
        .await
        .unwrap();

    let outcome = db
        .settlement
        .settle(created.bet_id, ResultRequest::Win { winning_side: Side::One })
        .await
        .unwrap();

    // Each side-1 account gets stake x odds = 1050 x 2.0 = 2100 gross
    assert_eq!(outcome.profit_amount, Some(dec!(4200)));
    assert_eq!(balance_of(&db, 1).await, dec!(3950) + dec!(2100));
    assert_eq!(balance_of(&db, 2).await, dec!(3950) + dec!(2100));

    // Losing side keeps its post-debit balance
    assert_eq!(balance_of(&db, 3).await, dec!(4300));
    assert_eq!(balance_of(&db, 4).await, dec!(4300));

    // Result row matches the credits
    let result = db
        .state
        .result_repo
        .find_by_bet(created.bet_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.result_type_enum(), ResultType::Win);
    assert_eq!(result.winning_team, Some(Side::One));
    assert_eq!(result.profit_amount, Some(dec!(4200)));

    // Bet left the active set
    assert!(db.betting.list_active_bets().await.unwrap().is_empty());

    db.cleanup().await;
}

#[tokio::test]
async fn test_settle_loss_changes_no_balances() {
    let db = TestDatabase::new().await;

    create_funded_account(&db, 1, dec!(5000)).await;
    create_funded_account(&db, 2, dec!(5000)).await;

    let created = db
        .betting
        .create_bet(bet_request(vec![1], vec![2], dec!(2100), dec!(2.0), dec!(3.0)))
        .await
        .unwrap();

    let before1 = balance_of(&db, 1).await;
    let before2 = balance_of(&db, 2).await;

    let outcome = db
        .settlement
        .settle(created.bet_id, ResultRequest::Loss)
        .await
        .unwrap();

    assert_eq!(outcome.result_type, ResultType::Loss);
    assert_eq!(outcome.loss_amount, Some(dec!(1750))); // 1050 + 700 staked
    assert_eq!(balance_of(&db, 1).await, before1);
    assert_eq!(balance_of(&db, 2).await, before2);

    let result = db
        .state
        .result_repo
        .find_by_bet(created.bet_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.result_type_enum(), ResultType::Loss);
    assert_eq!(result.winning_team, None);

    db.cleanup().await;
}

#[tokio::test]
async fn test_double_settlement_rejected() {
    let db = TestDatabase::new().await;

    create_funded_account(&db, 1, dec!(5000)).await;
    create_funded_account(&db, 2, dec!(5000)).await;

    let created = db
        .betting
        .create_bet(bet_request(vec![1], vec![2], dec!(2100), dec!(2.0), dec!(3.0)))
        .await
        .unwrap();

    db.settlement
        .settle(created.bet_id, ResultRequest::Win { winning_side: Side::One })
        .await
        .unwrap();

    let after_first = balance_of(&db, 1).await;

    let err = db
        .settlement
        .settle(created.bet_id, ResultRequest::Win { winning_side: Side::Two })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BetAlreadySettled(id) if id == created.bet_id));

    // Balances reflect only the first settlement
    assert_eq!(balance_of(&db, 1).await, after_first);
    assert_eq!(balance_of(&db, 2).await, dec!(4300));

    db.cleanup().await;
}

#[tokio::test]
async fn test_settle_unknown_bet() {
    let db = TestDatabase::new().await;

    let err = db
        .settlement
        .settle(9999, ResultRequest::Loss)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BetNotFound(9999)));

    db.cleanup().await;
}

#[tokio::test]
async fn test_cashout_applies_all_credits_atomically() {
    let db = TestDatabase::new().await;

    create_funded_account(&db, 1, dec!(5000)).await;
    create_funded_account(&db, 2, dec!(5000)).await;

    let created = db
        .betting
        .create_bet(bet_request(vec![1], vec![2], dec!(2100), dec!(2.0), dec!(3.0)))
        .await
        .unwrap();

    // Zero and stake-exceeding amounts are both accepted
    let entries = vec![
        CashoutEntry {
            account_id: 1,
            amount: dec!(3000),
        },
        CashoutEntry {
            account_id: 2,
            amount: dec!(0),
        },
    ];

    let outcome = db
        .settlement
        .settle(created.bet_id, ResultRequest::Cashout { entries: entries.clone() })
        .await
        .unwrap();

    assert_eq!(outcome.result_type, ResultType::Cashout);
    assert_eq!(balance_of(&db, 1).await, dec!(3950) + dec!(3000));
    assert_eq!(balance_of(&db, 2).await, dec!(4300));

    let result = db
        .state
        .result_repo
        .find_by_bet(created.bet_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.result_type_enum(), ResultType::Cashout);
    assert_eq!(result.cashout_details, entries);

    assert!(db.betting.list_active_bets().await.unwrap().is_empty());

    db.cleanup().await;
}

#[tokio::test]
async fn test_cashout_rejects_unstaked_account() {
    let db = TestDatabase::new().await;

    create_funded_account(&db, 1, dec!(5000)).await;
    create_funded_account(&db, 2, dec!(5000)).await;
    create_funded_account(&db, 3, dec!(5000)).await;

    let created = db
        .betting
        .create_bet(bet_request(vec![1], vec![2], dec!(2100), dec!(2.0), dec!(3.0)))
        .await
        .unwrap();

    let err = db
        .settlement
        .settle(
            created.bet_id,
            ResultRequest::Cashout {
                entries: vec![CashoutEntry {
                    account_id: 3,
                    amount: dec!(100),
                }],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    // Still settleable; nothing was applied
    assert_eq!(balance_of(&db, 3).await, dec!(5000));
    db.settlement
        .settle(created.bet_id, ResultRequest::Loss)
        .await
        .unwrap();

    db.cleanup().await;
}

#[tokio::test]
async fn test_cashout_rejects_negative_amount() {
    let db = TestDatabase::new().await;

    create_funded_account(&db, 1, dec!(5000)).await;
    create_funded_account(&db, 2, dec!(5000)).await;

    let created = db
        .betting
        .create_bet(bet_request(vec![1], vec![2], dec!(2100), dec!(2.0), dec!(3.0)))
        .await
        .unwrap();

    let err = db
        .settlement
        .settle(
            created.bet_id,
            ResultRequest::Cashout {
                entries: vec![CashoutEntry {
                    account_id: 1,
                    amount: dec!(-1),
                }],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    db.cleanup().await;
}

#[tokio::test]
async fn test_history_includes_result_and_allocations() {
    let db = TestDatabase::new().await;

    create_funded_account(&db, 1, dec!(5000)).await;
    create_funded_account(&db, 2, dec!(5000)).await;

    let created = db
        .betting
        .create_bet(bet_request(vec![1], vec![2], dec!(2100), dec!(2.0), dec!(3.0)))
        .await
        .unwrap();

    assert!(db.betting.history().await.unwrap().is_empty());

    db.settlement
        .settle(created.bet_id, ResultRequest::Win { winning_side: Side::Two })
        .await
        .unwrap();

    let history = db.betting.history().await.unwrap();
    assert_eq!(history.len(), 1);

    let entry = &history[0];
    assert_eq!(entry.bet.bet_id, created.bet_id);
    assert_eq!(entry.accounts.len(), 2);

    let result = entry.result.as_ref().expect("result missing from history");
    assert_eq!(result.result_type_enum(), ResultType::Win);
    assert_eq!(result.winning_team, Some(Side::Two));
    // 700 staked at odds 3.0
    assert_eq!(result.profit_amount, Some(dec!(2100.0)));

    db.cleanup().await;
}

#[tokio::test]
async fn test_concurrent_creates_cannot_overdraw() {
    let db = TestDatabase::new().await;

    create_funded_account(&db, 1, dec!(1000)).await;
    create_funded_account(&db, 2, dec!(5000)).await;
    create_funded_account(&db, 3, dec!(5000)).await;

    // Both bets want 700 from account 1; its 1000 covers only one
    let first = bet_request(vec![1], vec![2], dec!(1400), dec!(2.0), dec!(2.0));
    let second = bet_request(vec![1], vec![3], dec!(1400), dec!(2.0), dec!(2.0));

    let other_service = db.betting_service();
    let (a, b) = tokio::join!(
        db.betting.create_bet(first),
        other_service.create_bet(second)
    );

    let results = [a, b];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one concurrent bet may succeed");

    let err = results
        .into_iter()
        .find_map(Result::err)
        .expect("one creation must fail");
    match err {
        AppError::InsufficientBalance(shortfalls) => {
            assert_eq!(shortfalls.len(), 1);
            assert_eq!(shortfalls[0].account_id, 1);
            assert_eq!(shortfalls[0].required, dec!(700));
            // The loser saw the committed post-debit balance, not a stale read
            assert_eq!(shortfalls[0].available, dec!(300));
        }
        other => panic!("expected InsufficientBalance, got {:?}", other),
    }

    assert_eq!(balance_of(&db, 1).await, dec!(300));
    assert_eq!(db.betting.list_active_bets().await.unwrap().len(), 1);

    db.cleanup().await;
}
