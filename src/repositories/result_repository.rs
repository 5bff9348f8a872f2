use super::{parse_decimal, parse_side};
use crate::error::RepositoryError;
use crate::models::{BetResult, BetSummary, CashoutEntry, ResultType, Side};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::{FromRow, SqliteConnection, SqlitePool};

/// Repository for settlement results and completed-bet history
pub struct ResultRepository {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct ResultRow {
    result_id: i64,
    bet_id: i64,
    winning_team: Option<i64>,
    result_type: String,
    profit_amount: Option<String>,
    loss_amount: Option<String>,
    cashout_details: Option<String>,
    created_at: NaiveDateTime,
}

impl ResultRow {
    fn into_result(self) -> Result<BetResult, RepositoryError> {
        let winning_team = self.winning_team.map(parse_side).transpose()?;
        let profit_amount = self
            .profit_amount
            .as_deref()
            .map(|s| parse_decimal(s, "results.profit_amount"))
            .transpose()?;
        let loss_amount = self
            .loss_amount
            .as_deref()
            .map(|s| parse_decimal(s, "results.loss_amount"))
            .transpose()?;
        let cashout_details = match self.cashout_details.as_deref() {
            Some(json) if !json.is_empty() => serde_json::from_str(json)?,
            _ => Vec::new(),
        };

        Ok(BetResult {
            result_id: self.result_id,
            bet_id: self.bet_id,
            winning_team,
            result_type: self.result_type,
            profit_amount,
            loss_amount,
            cashout_details,
            created_at: self.created_at,
        })
    }
}

const SELECT_RESULT: &str = "SELECT result_id, bet_id, winning_team, result_type, \
                             profit_amount, loss_amount, cashout_details, created_at \
                             FROM results";

impl ResultRepository {
    /// Create a new ResultRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert the settlement record of a bet inside an open transaction.
    /// The unique index on bet_id rejects a second result for the same bet.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        bet_id: i64,
        winning_team: Option<Side>,
        result_type: ResultType,
        profit_amount: Option<Decimal>,
        loss_amount: Option<Decimal>,
        cashout_details: &[CashoutEntry],
    ) -> Result<i64, RepositoryError> {
        let cashout_json = serde_json::to_string(cashout_details)?;

        let result = sqlx::query(
            "INSERT INTO results \
             (bet_id, winning_team, result_type, profit_amount, loss_amount, cashout_details) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(bet_id)
        .bind(winning_team.map(|s| s.as_i64()))
        .bind(result_type.as_str())
        .bind(profit_amount.map(|d| d.to_string()))
        .bind(loss_amount.map(|d| d.to_string()))
        .bind(cashout_json)
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Find the settlement record of a bet
    pub async fn find_by_bet(&self, bet_id: i64) -> Result<Option<BetResult>, RepositoryError> {
        let row = sqlx::query_as::<_, ResultRow>(&format!("{} WHERE bet_id = ?", SELECT_RESULT))
            .bind(bet_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ResultRow::into_result).transpose()
    }

    /// Completed bets joined with match info and their results,
    /// newest match first
    pub async fn completed_with_results(
        &self,
    ) -> Result<Vec<(BetSummary, Option<BetResult>)>, RepositoryError> {
        #[derive(FromRow)]
        struct HistoryRow {
            bet_id: i64,
            team1: String,
            team2: String,
            match_date: NaiveDate,
            match_time: String,
            team1_odds: String,
            team2_odds: String,
            betting_value: String,
            created_at: NaiveDateTime,
            result_id: Option<i64>,
            winning_team: Option<i64>,
            result_type: Option<String>,
            profit_amount: Option<String>,
            loss_amount: Option<String>,
            cashout_details: Option<String>,
            result_created_at: Option<NaiveDateTime>,
        }

        let rows = sqlx::query_as::<_, HistoryRow>(
            "SELECT b.bet_id, m.team1, m.team2, m.match_date, m.match_time, \
                    b.team1_odds, b.team2_odds, b.betting_value, b.created_at, \
                    r.result_id, r.winning_team, r.result_type, r.profit_amount, \
                    r.loss_amount, r.cashout_details, r.created_at AS result_created_at \
             FROM bets b \
             JOIN matches m ON b.match_id = m.match_id \
             LEFT JOIN results r ON b.bet_id = r.bet_id \
             WHERE b.status = 'completed' \
             ORDER BY m.match_date DESC, m.match_time DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut history = Vec::with_capacity(rows.len());
        for row in rows {
            let summary = BetSummary {
                bet_id: row.bet_id,
                team1: row.team1,
                team2: row.team2,
                match_date: row.match_date,
                match_time: row.match_time,
                team1_odds: parse_decimal(&row.team1_odds, "bets.team1_odds")?,
                team2_odds: parse_decimal(&row.team2_odds, "bets.team2_odds")?,
                betting_value: parse_decimal(&row.betting_value, "bets.betting_value")?,
                created_at: row.created_at,
            };

            let result = match (row.result_id, row.result_type, row.result_created_at) {
                (Some(result_id), Some(result_type), Some(created_at)) => Some(
                    ResultRow {
                        result_id,
                        bet_id: row.bet_id,
                        winning_team: row.winning_team,
                        result_type,
                        profit_amount: row.profit_amount,
                        loss_amount: row.loss_amount,
                        cashout_details: row.cashout_details,
                        created_at,
                    }
                    .into_result()?,
                ),
                _ => None,
            };

            history.push((summary, result));
        }

        Ok(history)
    }
}
