use super::bet::{AllocationDetail, BetSummary};
use super::stake_allocation::Side;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Result kind for a settled bet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    Win,
    Loss,
    Cashout,
}

impl ResultType {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "win" => Ok(ResultType::Win),
            "loss" => Ok(ResultType::Loss),
            "cashout" => Ok(ResultType::Cashout),
            _ => Err(format!("Invalid result type: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultType::Win => "win",
            ResultType::Loss => "loss",
            ResultType::Cashout => "cashout",
        }
    }
}

impl From<String> for ResultType {
    fn from(s: String) -> Self {
        Self::from_str(&s).unwrap_or(ResultType::Loss)
    }
}

impl From<ResultType> for String {
    fn from(result_type: ResultType) -> Self {
        result_type.as_str().to_string()
    }
}

/// Per-account amount of a cashout settlement, stored as a JSON list
/// on the result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashoutEntry {
    pub account_id: i64,
    pub amount: Decimal,
}

/// Terminal record of a settled bet. Created exactly once, at settlement,
/// and never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetResult {
    pub result_id: i64,
    pub bet_id: i64,
    pub winning_team: Option<Side>,
    pub result_type: String, // Stored as TEXT, use ResultType enum for type safety
    pub profit_amount: Option<Decimal>,
    pub loss_amount: Option<Decimal>,
    pub cashout_details: Vec<CashoutEntry>,
    pub created_at: NaiveDateTime,
}

impl BetResult {
    /// Get result type as an enum
    pub fn result_type_enum(&self) -> ResultType {
        ResultType::from_str(&self.result_type).unwrap_or(ResultType::Loss)
    }
}

/// Completed-bet history row: summary + result + allocation detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalBet {
    pub bet: BetSummary,
    pub result: Option<BetResult>,
    pub accounts: Vec<AllocationDetail>,
}
