use super::parse_decimal;
use crate::error::{BalanceShortfall, RepositoryError};
use crate::models::Account;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::{FromRow, SqliteConnection, SqlitePool};

/// Repository for funding accounts; the balance ledger.
///
/// `debit`/`credit` run on a transaction handle so every balance change
/// commits together with the allocation or result row that explains it.
pub struct AccountRepository {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct AccountRow {
    account_id: i64,
    name: String,
    balance: String,
    remarks: Option<String>,
    is_active: bool,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl AccountRow {
    fn into_account(self) -> Result<Account, RepositoryError> {
        Ok(Account {
            account_id: self.account_id,
            name: self.name,
            balance: parse_decimal(&self.balance, "accounts.balance")?,
            remarks: self.remarks,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_ACCOUNT: &str = "SELECT account_id, name, balance, remarks, is_active, \
                              created_at, updated_at FROM accounts";

impl AccountRepository {
    /// Create a new AccountRepository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all active accounts in id order
    pub async fn list_active(&self) -> Result<Vec<Account>, RepositoryError> {
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "{} WHERE is_active = 1 ORDER BY account_id",
            SELECT_ACCOUNT
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AccountRow::into_account).collect()
    }

    /// Find an account by id
    pub async fn find_by_id(&self, account_id: i64) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "{} WHERE account_id = ?",
            SELECT_ACCOUNT
        ))
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    /// Insert or update an account (administrative edit)
    pub async fn save(&self, account: &Account) -> Result<Account, RepositoryError> {
        sqlx::query(
            "INSERT INTO accounts (account_id, name, balance, remarks, is_active) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(account_id) DO UPDATE SET \
               name = excluded.name, \
               balance = excluded.balance, \
               remarks = excluded.remarks, \
               is_active = excluded.is_active, \
               updated_at = CURRENT_TIMESTAMP",
        )
        .bind(account.account_id)
        .bind(&account.name)
        .bind(account.balance.to_string())
        .bind(&account.remarks)
        .bind(account.is_active)
        .execute(&self.pool)
        .await?;

        let saved = self.find_by_id(account.account_id).await?;
        saved.ok_or_else(|| {
            RepositoryError::NotFound(format!("account {} after save", account.account_id))
        })
    }

    /// Fetch an account inside an open transaction.
    ///
    /// Balance reads used for validation must come from the same transaction
    /// that later writes, or a concurrent commit makes them stale.
    pub async fn fetch_in_tx(
        &self,
        conn: &mut SqliteConnection,
        account_id: i64,
    ) -> Result<Option<Account>, RepositoryError> {
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "{} WHERE account_id = ?",
            SELECT_ACCOUNT
        ))
        .bind(account_id)
        .fetch_optional(&mut *conn)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    /// Debit an account. Refuses with the shortfall if the balance does not
    /// cover the amount; no partial debit occurs.
    pub async fn debit(
        &self,
        conn: &mut SqliteConnection,
        account_id: i64,
        amount: Decimal,
    ) -> Result<Account, RepositoryError> {
        let account = self
            .fetch_in_tx(conn, account_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("account {}", account_id)))?;

        if account.balance < amount {
            return Err(RepositoryError::InsufficientBalance(BalanceShortfall {
                account_id,
                required: amount,
                available: account.balance,
            }));
        }

        let new_balance = account.balance - amount;
        self.write_balance(conn, account_id, new_balance).await?;

        Ok(Account {
            balance: new_balance,
            ..account
        })
    }

    /// Credit an account. Always succeeds for a non-negative amount.
    pub async fn credit(
        &self,
        conn: &mut SqliteConnection,
        account_id: i64,
        amount: Decimal,
    ) -> Result<Account, RepositoryError> {
        let account = self
            .fetch_in_tx(conn, account_id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(format!("account {}", account_id)))?;

        let new_balance = account.balance + amount;
        self.write_balance(conn, account_id, new_balance).await?;

        Ok(Account {
            balance: new_balance,
            ..account
        })
    }

    async fn write_balance(
        &self,
        conn: &mut SqliteConnection,
        account_id: i64,
        balance: Decimal,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE accounts SET balance = ?, updated_at = CURRENT_TIMESTAMP \
             WHERE account_id = ?",
        )
        .bind(balance.to_string())
        .bind(account_id)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}
