use crate::error::RepositoryError;
use crate::models::Match;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{FromRow, SqliteConnection, SqlitePool};

/// Repository for match data access
pub struct MatchRepository {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct MatchRow {
    match_id: i64,
    team1: String,
    team2: String,
    match_date: NaiveDate,
    match_time: String,
    status: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl From<MatchRow> for Match {
    fn from(row: MatchRow) -> Self {
        Match {
            match_id: row.match_id,
            team1: row.team1,
            team2: row.team2,
            match_date: row.match_date,
            match_time: row.match_time,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_MATCH: &str = "SELECT match_id, team1, team2, match_date, match_time, status, \
                            created_at, updated_at FROM matches";

impl MatchRepository {
    /// Create a new MatchRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new match and return it
    pub async fn create(
        &self,
        team1: &str,
        team2: &str,
        match_date: NaiveDate,
        match_time: &str,
    ) -> Result<Match, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        let match_id = self.insert(&mut conn, team1, team2, match_date, match_time).await?;

        self.find_by_id(match_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("match {} after insert", match_id)))
    }

    /// Insert a new match inside an open transaction, returning its id
    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        team1: &str,
        team2: &str,
        match_date: NaiveDate,
        match_time: &str,
    ) -> Result<i64, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO matches (team1, team2, match_date, match_time) VALUES (?, ?, ?, ?)",
        )
        .bind(team1)
        .bind(team2)
        .bind(match_date)
        .bind(match_time)
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Find a match by id
    pub async fn find_by_id(&self, match_id: i64) -> Result<Option<Match>, RepositoryError> {
        let row =
            sqlx::query_as::<_, MatchRow>(&format!("{} WHERE match_id = ?", SELECT_MATCH))
                .bind(match_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(Match::from))
    }

    /// Find a match by id inside an open transaction
    pub async fn find_by_id_in_tx(
        &self,
        conn: &mut SqliteConnection,
        match_id: i64,
    ) -> Result<Option<Match>, RepositoryError> {
        let row =
            sqlx::query_as::<_, MatchRow>(&format!("{} WHERE match_id = ?", SELECT_MATCH))
                .bind(match_id)
                .fetch_optional(&mut *conn)
                .await?;

        Ok(row.map(Match::from))
    }

    /// List matches on a given date, earliest time slot first
    pub async fn list_for_date(&self, date: NaiveDate) -> Result<Vec<Match>, RepositoryError> {
        let rows = sqlx::query_as::<_, MatchRow>(&format!(
            "{} WHERE match_date = ? ORDER BY match_time, match_id",
            SELECT_MATCH
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Match::from).collect())
    }

    /// Delete a match; bets, allocations and results cascade.
    /// Returns whether a row was removed.
    pub async fn delete(&self, match_id: i64) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM matches WHERE match_id = ?")
            .bind(match_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
