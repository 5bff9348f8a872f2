//! BetBook Backend Library
//!
//! This module exposes the ledger and settlement components for use by
//! tests and other consumers.

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod repositories;
pub mod services;
pub mod stake;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use database::Database;
use repositories::*;
use std::path::PathBuf;
use std::sync::Arc;

/// Application state containing the store handle and all repositories
pub struct AppState {
    pub database: Database,
    pub account_repo: Arc<AccountRepository>,
    pub match_repo: Arc<MatchRepository>,
    pub bet_repo: Arc<BetRepository>,
    pub result_repo: Arc<ResultRepository>,
    pub settings_repo: Arc<SettingsRepository>,
}

impl AppState {
    /// Create a new AppState with initialized repositories
    pub fn new(pool: sqlx::SqlitePool, db_path: impl Into<PathBuf>) -> Self {
        let database = Database::new(pool.clone(), db_path);

        Self {
            database,
            account_repo: Arc::new(AccountRepository::new(pool.clone())),
            match_repo: Arc::new(MatchRepository::new(pool.clone())),
            bet_repo: Arc::new(BetRepository::new(pool.clone())),
            result_repo: Arc::new(ResultRepository::new(pool.clone())),
            settings_repo: Arc::new(SettingsRepository::new(pool)),
        }
    }
}
