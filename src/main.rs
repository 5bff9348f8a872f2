//! BetBook Backend Service
//!
//! Entry point for the BetBook betting-tracker backend. Boots the ledger
//! store, runs migrations and prints a summary of the current ledger state;
//! the form/dashboard presentation layer drives the services through the
//! library interface.

use betbook_backend::config::AppConfig;
use betbook_backend::database::{create_pool, run_migrations};
use betbook_backend::error::{AppError, AppResult};
use betbook_backend::services::{BettingService, SettlementService};
use betbook_backend::AppState;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    // Initialize tracing/logging with config
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("betbook_backend={},sqlx=warn", config.log_level).into()
            }),
        )
        .init();

    info!("BetBook backend starting");
    info!("Environment: {}", config.environment);
    info!("Database: {}", config.database_path());

    // =========================================================================
    // DATABASE SETUP
    // =========================================================================
    let pool = create_pool(&config.database).await.map_err(|e| {
        error!("Failed to create database pool: {}", e);
        AppError::Database(e)
    })?;

    run_migrations(&pool).await.map_err(|e| {
        error!("Database migration failed: {}", e);
        AppError::Database(e)
    })?;

    info!("Database ready (max connections: {})", config.database.max_connections);

    // =========================================================================
    // SERVICES
    // =========================================================================
    let app_state = Arc::new(AppState::new(pool.clone(), config.database_path()));

    let betting_service = BettingService::new(
        pool.clone(),
        app_state.account_repo.clone(),
        app_state.match_repo.clone(),
        app_state.bet_repo.clone(),
        app_state.result_repo.clone(),
        app_state.settings_repo.clone(),
        config.enforce_balanced_sides,
    );

    let _settlement_service = SettlementService::new(
        pool,
        app_state.account_repo.clone(),
        app_state.bet_repo.clone(),
        app_state.result_repo.clone(),
    );

    // =========================================================================
    // LEDGER SUMMARY
    // =========================================================================
    let accounts = betting_service.list_accounts().await?;
    let total_balance: Decimal = accounts.iter().map(|a| a.balance).sum();
    let active_bets = betting_service.list_active_bets().await?;
    let settings = betting_service.get_settings().await?;

    info!(
        accounts = accounts.len(),
        total_balance = %total_balance,
        active_bets = active_bets.len(),
        "Ledger state"
    );
    info!(
        min_transfer = %settings.min_transfer,
        default_betting_value = %settings.default_betting_value,
        "Settings"
    );

    info!("BetBook backend ready");
    Ok(())
}
