#![allow(dead_code)]

use betbook_backend::config::DatabaseConfig;
use betbook_backend::database::{create_pool, run_migrations};
use betbook_backend::models::*;
use betbook_backend::services::*;
use betbook_backend::AppState;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::SqlitePool;

/// Test database backed by a throwaway SQLite file
pub struct TestDatabase {
    pub pool: SqlitePool,
    pub path: String,
    pub state: AppState,
    pub betting: BettingService,
    pub settlement: SettlementService,
}

impl TestDatabase {
    /// Create a fresh database with migrations applied
    pub async fn new() -> Self {
        Self::with_policy(true).await
    }

    /// Create a fresh database with an explicit balanced-sides policy
    pub async fn with_policy(enforce_balanced_sides: bool) -> Self {
        let path = temp_db_path();

        let config = DatabaseConfig {
            path: path.clone(),
            max_connections: 5,
            acquire_timeout_secs: 10,
            busy_timeout_ms: 5000,
        };

        let pool = create_pool(&config)
            .await
            .expect("Failed to create test database pool");

        run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let state = AppState::new(pool.clone(), &path);

        let betting = BettingService::new(
            pool.clone(),
            state.account_repo.clone(),
            state.match_repo.clone(),
            state.bet_repo.clone(),
            state.result_repo.clone(),
            state.settings_repo.clone(),
            enforce_balanced_sides,
        );

        let settlement = SettlementService::new(
            pool.clone(),
            state.account_repo.clone(),
            state.bet_repo.clone(),
            state.result_repo.clone(),
        );

        Self {
            pool,
            path,
            state,
            betting,
            settlement,
        }
    }

    /// A second settlement service sharing the same store
    pub fn settlement_service(&self) -> SettlementService {
        SettlementService::new(
            self.pool.clone(),
            self.state.account_repo.clone(),
            self.state.bet_repo.clone(),
            self.state.result_repo.clone(),
        )
    }

    /// A second betting service sharing the same store
    pub fn betting_service(&self) -> BettingService {
        BettingService::new(
            self.pool.clone(),
            self.state.account_repo.clone(),
            self.state.match_repo.clone(),
            self.state.bet_repo.clone(),
            self.state.result_repo.clone(),
            self.state.settings_repo.clone(),
            true,
        )
    }

    /// Close the pool and delete the database files
    pub async fn cleanup(self) {
        self.pool.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", self.path, suffix));
        }
    }
}

fn temp_db_path() -> String {
    let mut p = std::env::temp_dir();
    p.push(format!("betbook_test_{}.db", uuid::Uuid::new_v4()));
    p.to_string_lossy().to_string()
}

/// Create an account holding `balance`
pub async fn create_funded_account(db: &TestDatabase, account_id: i64, balance: Decimal) -> Account {
    db.betting
        .save_account(Account::new(
            account_id,
            format!("Account {}", account_id),
            balance,
        ))
        .await
        .expect("Failed to create test account")
}

/// Standard two-a-side bet request against a new match
pub fn bet_request(
    accounts1: Vec<i64>,
    accounts2: Vec<i64>,
    betting_value: Decimal,
    team1_odds: Decimal,
    team2_odds: Decimal,
) -> CreateBetRequest {
    CreateBetRequest {
        match_ref: MatchRef::New {
            team1: "Chennai Super Kings".to_string(),
            team2: "Mumbai Indians".to_string(),
            match_date: NaiveDate::from_ymd_opt(2025, 4, 12).unwrap(),
            match_time: "7:30 PM".to_string(),
        },
        team1_odds,
        team2_odds,
        betting_value,
        accounts1,
        accounts2,
        stake1: None,
        stake2: None,
        exact_stakes: false,
    }
}

/// Fetch an account's current balance straight from the store
pub async fn balance_of(db: &TestDatabase, account_id: i64) -> Decimal {
    db.state
        .account_repo
        .find_by_id(account_id)
        .await
        .expect("Failed to fetch account")
        .expect("Account missing")
        .balance
}
