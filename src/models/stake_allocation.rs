use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One of the two competing outcomes a bet is split across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    One,
    Two,
}

impl Side {
    /// Convert to the stored team number (1 or 2)
    pub fn as_i64(&self) -> i64 {
        match self {
            Side::One => 1,
            Side::Two => 2,
        }
    }

    /// Convert from a stored team number
    pub fn from_i64(n: i64) -> Result<Self, String> {
        match n {
            1 => Ok(Side::One),
            2 => Ok(Side::Two),
            _ => Err(format!("Invalid side: {}", n)),
        }
    }

    /// The opposing side
    pub fn other(&self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}

/// An account's stake on one side of a bet.
///
/// Composite identity (bet_id, account_id): an account holds at most one
/// allocation per bet, and the sides of a bet never share an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StakeAllocation {
    pub bet_id: i64,
    pub account_id: i64,
    pub side: Side,
    pub bet_amount: Decimal,
    pub status: String,
    pub created_at: NaiveDateTime,
}
