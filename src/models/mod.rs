//! Domain models for the BetBook backend.
//!
//! This module contains all database-backed models representing
//! the core entities of the betting ledger.

pub mod account;
pub mod bet;
pub mod bet_result;
pub mod settings;
pub mod sports_match;
pub mod stake_allocation;

// Re-export all models for convenient access
pub use account::Account;
pub use bet::{AllocationDetail, Bet, BetDetail, BetStatus, BetSummary};
pub use bet_result::{BetResult, CashoutEntry, HistoricalBet, ResultType};
pub use settings::Settings;
pub use sports_match::{Match, MatchStatus};
pub use stake_allocation::{Side, StakeAllocation};
