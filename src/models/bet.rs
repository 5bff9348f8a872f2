use super::stake_allocation::Side;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Bet status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetStatus {
    Active,
    Completed,
}

impl BetStatus {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "active" => Ok(BetStatus::Active),
            "completed" => Ok(BetStatus::Completed),
            _ => Err(format!("Invalid status: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            BetStatus::Active => "active",
            BetStatus::Completed => "completed",
        }
    }
}

impl From<String> for BetStatus {
    fn from(s: String) -> Self {
        Self::from_str(&s).unwrap_or(BetStatus::Active)
    }
}

impl From<BetStatus> for String {
    fn from(status: BetStatus) -> Self {
        status.as_str().to_string()
    }
}

/// A bet splitting a total betting value across two outcomes of a match.
///
/// Immutable once created except for the single `active -> completed`
/// transition at settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bet {
    pub bet_id: i64,
    pub match_id: i64,
    pub team1_odds: Decimal,
    pub team2_odds: Decimal,
    pub betting_value: Decimal,
    pub status: String, // Stored as TEXT, use BetStatus enum for type safety
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Bet {
    /// Get status as an enum
    pub fn status_enum(&self) -> BetStatus {
        BetStatus::from_str(&self.status).unwrap_or(BetStatus::Active)
    }

    /// Check if bet is still open for settlement
    pub fn is_active(&self) -> bool {
        self.status_enum() == BetStatus::Active
    }

    /// Payout multiplier for the given side
    pub fn odds_for(&self, side: Side) -> Decimal {
        match side {
            Side::One => self.team1_odds,
            Side::Two => self.team2_odds,
        }
    }
}

/// Active-bet listing row: bet joined with its match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetSummary {
    pub bet_id: i64,
    pub team1: String,
    pub team2: String,
    pub match_date: NaiveDate,
    pub match_time: String,
    pub team1_odds: Decimal,
    pub team2_odds: Decimal,
    pub betting_value: Decimal,
    pub created_at: NaiveDateTime,
}

/// One allocation joined with a snapshot of its account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationDetail {
    pub account_id: i64,
    pub name: String,
    pub balance: Decimal,
    pub side: Side,
    pub bet_amount: Decimal,
}

/// Full bet view: bet + match + every allocation with account snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetDetail {
    pub bet: Bet,
    pub team1: String,
    pub team2: String,
    pub match_date: NaiveDate,
    pub match_time: String,
    pub accounts: Vec<AllocationDetail>,
}

impl BetDetail {
    /// Allocations on one side, in account order
    pub fn side_accounts(&self, side: Side) -> impl Iterator<Item = &AllocationDetail> {
        self.accounts.iter().filter(move |a| a.side == side)
    }
}
