use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Singleton user-tunable settings record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub min_transfer: Decimal,
    pub default_betting_value: Decimal,
    pub updated_at: NaiveDateTime,
}

impl Settings {
    /// Built-in defaults, matching the seeded settings row
    pub fn defaults() -> Self {
        Self {
            min_transfer: Decimal::new(25000, 2),
            default_betting_value: Decimal::new(210000, 2),
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }
}
