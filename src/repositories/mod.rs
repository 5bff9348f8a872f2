//! Row-level data access for the ledger store.
//!
//! Read methods run against the shared pool. Write methods take an explicit
//! `&mut SqliteConnection` so the services can thread a single transaction
//! through every row touched by one lifecycle operation.

pub mod account_repository;
pub mod bet_repository;
pub mod match_repository;
pub mod result_repository;
pub mod settings_repository;

// Re-export all repositories for convenient access
pub use account_repository::AccountRepository;
pub use bet_repository::BetRepository;
pub use match_repository::MatchRepository;
pub use result_repository::ResultRepository;
pub use settings_repository::SettingsRepository;

use crate::error::RepositoryError;
use crate::models::Side;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a money column stored as decimal text.
pub(crate) fn parse_decimal(value: &str, column: &str) -> Result<Decimal, RepositoryError> {
    Decimal::from_str(value)
        .map_err(|e| RepositoryError::InvalidDecimal(format!("{}: {}", column, e)))
}

/// Parse a stored team number into a side.
pub(crate) fn parse_side(value: i64) -> Result<Side, RepositoryError> {
    Side::from_i64(value).map_err(RepositoryError::ConstraintViolation)
}
