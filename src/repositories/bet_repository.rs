use super::{parse_decimal, parse_side};
use crate::error::RepositoryError;
use crate::models::{AllocationDetail, Bet, BetDetail, BetStatus, BetSummary, Side, StakeAllocation};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::{FromRow, SqliteConnection, SqlitePool};

/// Repository for bet and stake-allocation data access
pub struct BetRepository {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct BetRow {
    bet_id: i64,
    match_id: i64,
    team1_odds: String,
    team2_odds: String,
    betting_value: String,
    status: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl BetRow {
    fn into_bet(self) -> Result<Bet, RepositoryError> {
        Ok(Bet {
            bet_id: self.bet_id,
            match_id: self.match_id,
            team1_odds: parse_decimal(&self.team1_odds, "bets.team1_odds")?,
            team2_odds: parse_decimal(&self.team2_odds, "bets.team2_odds")?,
            betting_value: parse_decimal(&self.betting_value, "bets.betting_value")?,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct AllocationRow {
    bet_id: i64,
    account_id: i64,
    team_number: i64,
    bet_amount: String,
    status: String,
    created_at: NaiveDateTime,
}

impl AllocationRow {
    fn into_allocation(self) -> Result<StakeAllocation, RepositoryError> {
        Ok(StakeAllocation {
            bet_id: self.bet_id,
            account_id: self.account_id,
            side: parse_side(self.team_number)?,
            bet_amount: parse_decimal(&self.bet_amount, "bet_accounts.bet_amount")?,
            status: self.status,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct BetSummaryRow {
    bet_id: i64,
    team1: String,
    team2: String,
    match_date: NaiveDate,
    match_time: String,
    team1_odds: String,
    team2_odds: String,
    betting_value: String,
    created_at: NaiveDateTime,
}

impl BetSummaryRow {
    fn into_summary(self) -> Result<BetSummary, RepositoryError> {
        Ok(BetSummary {
            bet_id: self.bet_id,
            team1: self.team1,
            team2: self.team2,
            match_date: self.match_date,
            match_time: self.match_time,
            team1_odds: parse_decimal(&self.team1_odds, "bets.team1_odds")?,
            team2_odds: parse_decimal(&self.team2_odds, "bets.team2_odds")?,
            betting_value: parse_decimal(&self.betting_value, "bets.betting_value")?,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct AllocationDetailRow {
    account_id: i64,
    name: String,
    balance: String,
    team_number: i64,
    bet_amount: String,
}

impl AllocationDetailRow {
    fn into_detail(self) -> Result<AllocationDetail, RepositoryError> {
        Ok(AllocationDetail {
            account_id: self.account_id,
            name: self.name,
            balance: parse_decimal(&self.balance, "accounts.balance")?,
            side: parse_side(self.team_number)?,
            bet_amount: parse_decimal(&self.bet_amount, "bet_accounts.bet_amount")?,
        })
    }
}

const SELECT_BET: &str = "SELECT bet_id, match_id, team1_odds, team2_odds, betting_value, \
                          status, created_at, updated_at FROM bets";

const SELECT_ALLOCATION: &str = "SELECT bet_id, account_id, team_number, bet_amount, status, \
                                 created_at FROM bet_accounts";

impl BetRepository {
    /// Create a new BetRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new bet inside an open transaction, returning its id
    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        match_id: i64,
        team1_odds: Decimal,
        team2_odds: Decimal,
        betting_value: Decimal,
    ) -> Result<i64, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO bets (match_id, team1_odds, team2_odds, betting_value) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(match_id)
        .bind(team1_odds.to_string())
        .bind(team2_odds.to_string())
        .bind(betting_value.to_string())
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Insert one stake allocation inside an open transaction
    pub async fn insert_allocation(
        &self,
        conn: &mut SqliteConnection,
        bet_id: i64,
        account_id: i64,
        side: Side,
        bet_amount: Decimal,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO bet_accounts (bet_id, account_id, team_number, bet_amount) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(bet_id)
        .bind(account_id)
        .bind(side.as_i64())
        .bind(bet_amount.to_string())
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Find a bet by id
    pub async fn find_by_id(&self, bet_id: i64) -> Result<Option<Bet>, RepositoryError> {
        let row = sqlx::query_as::<_, BetRow>(&format!("{} WHERE bet_id = ?", SELECT_BET))
            .bind(bet_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(BetRow::into_bet).transpose()
    }

    /// Find a bet by id inside an open transaction
    pub async fn find_by_id_in_tx(
        &self,
        conn: &mut SqliteConnection,
        bet_id: i64,
    ) -> Result<Option<Bet>, RepositoryError> {
        let row = sqlx::query_as::<_, BetRow>(&format!("{} WHERE bet_id = ?", SELECT_BET))
            .bind(bet_id)
            .fetch_optional(&mut *conn)
            .await?;

        row.map(BetRow::into_bet).transpose()
    }

    /// All stake allocations of a bet, side 1 first
    pub async fn allocations(&self, bet_id: i64) -> Result<Vec<StakeAllocation>, RepositoryError> {
        let rows = sqlx::query_as::<_, AllocationRow>(&format!(
            "{} WHERE bet_id = ? ORDER BY team_number, account_id",
            SELECT_ALLOCATION
        ))
        .bind(bet_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AllocationRow::into_allocation).collect()
    }

    /// All stake allocations of a bet, read inside an open transaction
    pub async fn allocations_in_tx(
        &self,
        conn: &mut SqliteConnection,
        bet_id: i64,
    ) -> Result<Vec<StakeAllocation>, RepositoryError> {
        let rows = sqlx::query_as::<_, AllocationRow>(&format!(
            "{} WHERE bet_id = ? ORDER BY team_number, account_id",
            SELECT_ALLOCATION
        ))
        .bind(bet_id)
        .fetch_all(&mut *conn)
        .await?;

        rows.into_iter().map(AllocationRow::into_allocation).collect()
    }

    /// All stake allocations held by one account, newest bet first
    pub async fn allocations_for_account(
        &self,
        account_id: i64,
    ) -> Result<Vec<StakeAllocation>, RepositoryError> {
        let rows = sqlx::query_as::<_, AllocationRow>(&format!(
            "{} WHERE account_id = ? ORDER BY bet_id DESC",
            SELECT_ALLOCATION
        ))
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AllocationRow::into_allocation).collect()
    }

    /// Flip a bet to completed inside an open transaction
    pub async fn mark_completed(
        &self,
        conn: &mut SqliteConnection,
        bet_id: i64,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE bets SET status = ?, updated_at = CURRENT_TIMESTAMP WHERE bet_id = ?",
        )
        .bind(BetStatus::Completed.as_str())
        .bind(bet_id)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// All active bets with their match info, ordered by match schedule
    pub async fn list_active(&self) -> Result<Vec<BetSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, BetSummaryRow>(
            "SELECT b.bet_id, m.team1, m.team2, m.match_date, m.match_time, \
                    b.team1_odds, b.team2_odds, b.betting_value, b.created_at \
             FROM bets b \
             JOIN matches m ON b.match_id = m.match_id \
             WHERE b.status = 'active' \
             ORDER BY m.match_date, m.match_time",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BetSummaryRow::into_summary).collect()
    }

    /// Allocations of a bet joined with account snapshots
    pub async fn allocation_details(
        &self,
        bet_id: i64,
    ) -> Result<Vec<AllocationDetail>, RepositoryError> {
        let rows = sqlx::query_as::<_, AllocationDetailRow>(
            "SELECT a.account_id, a.name, a.balance, ba.team_number, ba.bet_amount \
             FROM bet_accounts ba \
             JOIN accounts a ON ba.account_id = a.account_id \
             WHERE ba.bet_id = ? \
             ORDER BY ba.team_number, a.account_id",
        )
        .bind(bet_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AllocationDetailRow::into_detail).collect()
    }

    /// Full bet view: bet + match + allocations with account snapshots
    pub async fn detail(&self, bet_id: i64) -> Result<Option<BetDetail>, RepositoryError> {
        #[derive(FromRow)]
        struct DetailRow {
            bet_id: i64,
            match_id: i64,
            team1_odds: String,
            team2_odds: String,
            betting_value: String,
            status: String,
            created_at: NaiveDateTime,
            updated_at: NaiveDateTime,
            team1: String,
            team2: String,
            match_date: NaiveDate,
            match_time: String,
        }

        let row = sqlx::query_as::<_, DetailRow>(
            "SELECT b.bet_id, b.match_id, b.team1_odds, b.team2_odds, b.betting_value, \
                    b.status, b.created_at, b.updated_at, \
                    m.team1, m.team2, m.match_date, m.match_time \
             FROM bets b \
             JOIN matches m ON b.match_id = m.match_id \
             WHERE b.bet_id = ?",
        )
        .bind(bet_id)
        .fetch_optional(&self.pool)
        .await?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let bet = Bet {
            bet_id: row.bet_id,
            match_id: row.match_id,
            team1_odds: parse_decimal(&row.team1_odds, "bets.team1_odds")?,
            team2_odds: parse_decimal(&row.team2_odds, "bets.team2_odds")?,
            betting_value: parse_decimal(&row.betting_value, "bets.betting_value")?,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        };

        let accounts = self.allocation_details(bet_id).await?;

        Ok(Some(BetDetail {
            bet,
            team1: row.team1,
            team2: row.team2,
            match_date: row.match_date,
            match_time: row.match_time,
            accounts,
        }))
    }

    /// Delete a bet; allocations and results cascade.
    /// Returns whether a row was removed.
    pub async fn delete(&self, bet_id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM bets WHERE bet_id = ?")
            .bind(bet_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
