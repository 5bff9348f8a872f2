use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A funding account that stakes can be drawn from and winnings paid into.
///
/// The balance is mutated only through bet creation (debit) and settlement
/// (credit); administrative edits go through the save/upsert path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub account_id: i64,
    pub name: String,
    pub balance: Decimal,
    pub remarks: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Account {
    /// Create a new Account (typically used for creating from API input)
    pub fn new(account_id: i64, name: impl Into<String>, balance: Decimal) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            account_id,
            name: name.into(),
            balance,
            remarks: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the account can cover a debit of `amount`
    pub fn can_cover(&self, amount: Decimal) -> bool {
        self.balance >= amount
    }
}
