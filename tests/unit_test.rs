use betbook_backend::error::{AppError, BalanceShortfall};
use betbook_backend::models::*;
use betbook_backend::stake::compute_stake;
use rust_decimal_macros::dec;

/// Unit tests for the stake calculator
#[test]
fn test_stake_rounding() {
    assert_eq!(compute_stake(dec!(2100), dec!(2.0), false).unwrap(), dec!(1050));
    assert_eq!(compute_stake(dec!(2100), dec!(3.0), false).unwrap(), dec!(700));
}

#[test]
fn test_stake_exact() {
    let stake = compute_stake(dec!(1000), dec!(3.0), true).unwrap();
    assert_eq!(stake.round_dp(2), dec!(333.33));
    // Ceiling kicks in only when rounding is requested
    assert_eq!(compute_stake(dec!(1000), dec!(3.0), false).unwrap(), dec!(334));
}

#[test]
fn test_stake_invalid_input() {
    assert!(matches!(
        compute_stake(dec!(0), dec!(2.0), false),
        Err(AppError::InvalidInput(_))
    ));
    assert!(matches!(
        compute_stake(dec!(2100), dec!(-2.0), false),
        Err(AppError::InvalidInput(_))
    ));
}

/// Unit tests for Models
#[test]
fn test_side_conversion() {
    assert_eq!(Side::One.as_i64(), 1);
    assert_eq!(Side::Two.as_i64(), 2);
    assert_eq!(Side::from_i64(1).unwrap(), Side::One);
    assert_eq!(Side::from_i64(2).unwrap(), Side::Two);
    assert!(Side::from_i64(3).is_err());
    assert_eq!(Side::One.other(), Side::Two);
}

#[test]
fn test_bet_status_conversion() {
    assert_eq!(BetStatus::Active.as_str(), "active");
    assert_eq!(BetStatus::Completed.as_str(), "completed");
    assert_eq!(BetStatus::from_str("Completed").unwrap(), BetStatus::Completed);
    assert!(BetStatus::from_str("void").is_err());
}

#[test]
fn test_match_status_conversion() {
    assert_eq!(MatchStatus::Upcoming.as_str(), "upcoming");
    assert_eq!(MatchStatus::from_str("upcoming").unwrap(), MatchStatus::Upcoming);
}

#[test]
fn test_result_type_conversion() {
    assert_eq!(ResultType::Win.as_str(), "win");
    assert_eq!(ResultType::Loss.as_str(), "loss");
    assert_eq!(ResultType::Cashout.as_str(), "cashout");
    assert_eq!(ResultType::from_str("WIN").unwrap(), ResultType::Win);
    assert!(ResultType::from_str("draw").is_err());
}

#[test]
fn test_bet_odds_for_side() {
    let bet = Bet {
        bet_id: 1,
        match_id: 1,
        team1_odds: dec!(2.0),
        team2_odds: dec!(3.5),
        betting_value: dec!(2100),
        status: "active".to_string(),
        created_at: chrono::Utc::now().naive_utc(),
        updated_at: chrono::Utc::now().naive_utc(),
    };

    assert_eq!(bet.odds_for(Side::One), dec!(2.0));
    assert_eq!(bet.odds_for(Side::Two), dec!(3.5));
    assert!(bet.is_active());
}

#[test]
fn test_account_can_cover() {
    let account = Account::new(1, "Account 1", dec!(1000));
    assert!(account.can_cover(dec!(1000)));
    assert!(account.can_cover(dec!(999.99)));
    assert!(!account.can_cover(dec!(1000.01)));
}

/// Unit tests for Error Handling
#[test]
fn test_insufficient_balance_lists_every_shortfall() {
    let err = AppError::InsufficientBalance(vec![
        BalanceShortfall {
            account_id: 1,
            required: dec!(1050),
            available: dec!(900),
        },
        BalanceShortfall {
            account_id: 4,
            required: dec!(700),
            available: dec!(0),
        },
    ]);

    let message = err.to_string();
    assert!(message.contains("account 1"));
    assert!(message.contains("account 4"));
    assert!(message.contains("1050"));
    assert!(message.contains("700"));
    assert!(err.is_validation());
}

#[test]
fn test_error_classification() {
    assert!(AppError::BetNotFound(7).is_not_found());
    assert!(AppError::NotFound("account 3".into()).is_not_found());
    assert!(!AppError::BetAlreadySettled(7).is_not_found());
    assert!(AppError::AccountOnBothSides(vec![2]).is_validation());
    assert!(AppError::UnbalancedSides { side1: 2, side2: 1 }.is_validation());
    assert!(!AppError::BetNotFound(7).is_validation());
}

#[test]
fn test_cashout_entry_round_trip() {
    let entries = vec![
        CashoutEntry {
            account_id: 1,
            amount: dec!(450.50),
        },
        CashoutEntry {
            account_id: 2,
            amount: dec!(0),
        },
    ];

    let json = serde_json::to_string(&entries).unwrap();
    let parsed: Vec<CashoutEntry> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, entries);
}

#[test]
fn test_settings_defaults() {
    let settings = Settings::defaults();
    assert_eq!(settings.min_transfer, dec!(250.00));
    assert_eq!(settings.default_betting_value, dec!(2100.00));
}
