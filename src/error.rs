use crate::database::DatabaseError;
use rust_decimal::Decimal;
use sqlx::Error as SqlxError;
use thiserror::Error;

/// One account that cannot cover its side's stake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceShortfall {
    pub account_id: i64,
    pub required: Decimal,
    pub available: Decimal,
}

impl std::fmt::Display for BalanceShortfall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "account {}: required {}, available {}",
            self.account_id, self.required, self.available
        )
    }
}

fn join_shortfalls(shortfalls: &[BalanceShortfall]) -> String {
    shortfalls
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Storage failures (wraps underlying I/O and transaction errors)
    #[error("Storage failure: {0}")]
    Storage(#[from] SqlxError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed or out-of-range input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// One or both sides of a bet have no accounts selected
    #[error("No accounts selected for {0}")]
    MissingAccounts(String),

    /// The same account appears on both sides of a bet
    #[error("Accounts selected on both sides: {0:?}")]
    AccountOnBothSides(Vec<i64>),

    /// Side account counts differ (balanced-sides policy)
    #[error("Unequal account counts: side 1 has {side1}, side 2 has {side2}")]
    UnbalancedSides { side1: usize, side2: usize },

    /// One or more accounts cannot cover the requested stake.
    /// Carries every shortfall, not just the first.
    #[error("Insufficient balance: {}", join_shortfalls(.0))]
    InsufficientBalance(Vec<BalanceShortfall>),

    /// Bet does not exist
    #[error("Bet {0} not found")]
    BetNotFound(i64),

    /// Bet has already been settled
    #[error("Bet {0} is already settled")]
    BetAlreadySettled(i64),

    /// Other referenced resource does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Corrupt decimal value read from storage
    #[error("Invalid decimal: {0}")]
    InvalidDecimal(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Check if error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_) | AppError::BetNotFound(_))
    }

    /// Check if error is a validation failure (rejected before any write)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::InvalidInput(_)
                | AppError::MissingAccounts(_)
                | AppError::AccountOnBothSides(_)
                | AppError::UnbalancedSides { .. }
                | AppError::InsufficientBalance(_)
        )
    }
}

/// Repository-specific error types
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database query error
    #[error("Query error: {0}")]
    Query(SqlxError),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Duplicate record
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// A debit refused by the balance ledger
    #[error("Insufficient balance: {0}")]
    InsufficientBalance(BalanceShortfall),

    /// Corrupt decimal text in a money column
    #[error("Invalid decimal: {0}")]
    InvalidDecimal(String),

    /// Serialization error for JSON columns
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => AppError::NotFound(msg),
            RepositoryError::Query(e) => AppError::Storage(e),
            RepositoryError::Duplicate(msg) => AppError::InvalidInput(format!("duplicate: {}", msg)),
            RepositoryError::ConstraintViolation(msg) => AppError::InvalidInput(msg),
            RepositoryError::InsufficientBalance(shortfall) => {
                AppError::InsufficientBalance(vec![shortfall])
            }
            RepositoryError::InvalidDecimal(msg) => AppError::InvalidDecimal(msg),
            RepositoryError::Serialization(e) => AppError::Serialization(e),
        }
    }
}

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        match &err {
            SqlxError::RowNotFound => RepositoryError::NotFound("Record not found".to_string()),
            SqlxError::Database(db_err) => {
                // SQLite extended result codes
                let code = db_err.code().map(|c| c.to_string());
                match code.as_deref() {
                    // Unique / primary-key violation
                    Some("2067") | Some("1555") => {
                        RepositoryError::Duplicate(db_err.message().to_string())
                    }
                    // Foreign-key or CHECK constraint violation
                    Some("787") | Some("275") => {
                        RepositoryError::ConstraintViolation(db_err.message().to_string())
                    }
                    _ => RepositoryError::Query(err),
                }
            }
            _ => RepositoryError::Query(err),
        }
    }
}
