use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Match status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Upcoming,
    Completed,
}

impl MatchStatus {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "upcoming" => Ok(MatchStatus::Upcoming),
            "completed" => Ok(MatchStatus::Completed),
            _ => Err(format!("Invalid status: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Upcoming => "upcoming",
            MatchStatus::Completed => "completed",
        }
    }
}

impl From<String> for MatchStatus {
    fn from(s: String) -> Self {
        Self::from_str(&s).unwrap_or(MatchStatus::Upcoming)
    }
}

impl From<MatchStatus> for String {
    fn from(status: MatchStatus) -> Self {
        status.as_str().to_string()
    }
}

/// A fixture two outcomes are bet against. Created implicitly when a bet
/// names a new pairing, or explicitly for reuse across multiple bets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub match_id: i64,
    pub team1: String,
    pub team2: String,
    pub match_date: NaiveDate,
    pub match_time: String,
    pub status: String, // Stored as TEXT, use MatchStatus enum for type safety
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Match {
    /// Get status as an enum
    pub fn status_enum(&self) -> MatchStatus {
        MatchStatus::from_str(&self.status).unwrap_or(MatchStatus::Upcoming)
    }
}
