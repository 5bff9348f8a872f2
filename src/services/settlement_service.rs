use crate::error::{AppError, AppResult};
use crate::models::{Account, Bet, CashoutEntry, ResultType, Side};
use crate::repositories::{AccountRepository, BetRepository, ResultRepository};
use rust_decimal::Decimal;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

/// How a bet is being settled
#[derive(Debug, Clone)]
pub enum ResultRequest {
    Win { winning_side: Side },
    Loss,
    Cashout { entries: Vec<CashoutEntry> },
}

/// Outcome of a settlement
#[derive(Debug, Clone)]
pub struct SettlementOutcome {
    pub bet_id: i64,
    pub result_id: i64,
    pub result_type: ResultType,
    pub winning_team: Option<Side>,
    pub profit_amount: Option<Decimal>,
    pub loss_amount: Option<Decimal>,
    /// Post-transaction snapshots of every credited account
    pub accounts: Vec<Account>,
}

/// Settlement service: the terminal operation that closes a bet and applies
/// the resulting balance changes.
///
/// Every settlement is one transaction: the status guard, the credits, the
/// result row and the completion flip commit together or not at all.
pub struct SettlementService {
    pool: SqlitePool,
    account_repo: Arc<AccountRepository>,
    bet_repo: Arc<BetRepository>,
    result_repo: Arc<ResultRepository>,
}

impl SettlementService {
    /// Create a new settlement service
    pub fn new(
        pool: SqlitePool,
        account_repo: Arc<AccountRepository>,
        bet_repo: Arc<BetRepository>,
        result_repo: Arc<ResultRepository>,
    ) -> Self {
        Self {
            pool,
            account_repo,
            bet_repo,
            result_repo,
        }
    }

    /// Settle a bet. A bet settles exactly once; the second attempt fails
    /// with `BetAlreadySettled` and changes nothing.
    pub async fn settle(&self, bet_id: i64, request: ResultRequest) -> AppResult<SettlementOutcome> {
        match request {
            ResultRequest::Win { winning_side } => self.settle_win(bet_id, winning_side).await,
            ResultRequest::Loss => self.settle_loss(bet_id).await,
            ResultRequest::Cashout { entries } => self.settle_cashout(bet_id, entries).await,
        }
    }

    /// Credit each winning-side account its gross return (stake x odds) and
    /// record the aggregate as the result's profit. Losing-side stakes were
    /// debited at creation; no further balance change.
    async fn settle_win(&self, bet_id: i64, winning_side: Side) -> AppResult<SettlementOutcome> {
        info!(bet_id, side = %winning_side, "Settling bet as win");

        let mut tx = self.begin().await?;
        let bet = self.fetch_active_bet(&mut tx, bet_id).await?;
        let allocations = self.bet_repo.allocations_in_tx(&mut tx, bet_id).await?;

        let odds = bet.odds_for(winning_side);
        let mut total_profit = Decimal::ZERO;
        let mut accounts = Vec::new();
        for allocation in allocations.iter().filter(|a| a.side == winning_side) {
            let profit = allocation.bet_amount * odds;
            let updated = self
                .account_repo
                .credit(&mut tx, allocation.account_id, profit)
                .await?;
            total_profit += profit;
            accounts.push(updated);
        }

        let result_id = self
            .result_repo
            .insert(
                &mut tx,
                bet_id,
                Some(winning_side),
                ResultType::Win,
                Some(total_profit),
                None,
                &[],
            )
            .await?;
        self.bet_repo.mark_completed(&mut tx, bet_id).await?;

        tx.commit().await?;

        info!(bet_id, profit = %total_profit, "Win applied");

        Ok(SettlementOutcome {
            bet_id,
            result_id,
            result_type: ResultType::Win,
            winning_team: Some(winning_side),
            profit_amount: Some(total_profit),
            loss_amount: None,
            accounts,
        })
    }

    /// Close the bet with no balance changes; the loss is already reflected
    /// by the creation-time debits. The aggregate stake is recorded on the
    /// result for the history view.
    async fn settle_loss(&self, bet_id: i64) -> AppResult<SettlementOutcome> {
        info!(bet_id, "Settling bet as loss");

        let mut tx = self.begin().await?;
        self.fetch_active_bet(&mut tx, bet_id).await?;
        let allocations = self.bet_repo.allocations_in_tx(&mut tx, bet_id).await?;

        let total_staked: Decimal = allocations.iter().map(|a| a.bet_amount).sum();

        let result_id = self
            .result_repo
            .insert(
                &mut tx,
                bet_id,
                None,
                ResultType::Loss,
                None,
                Some(total_staked),
                &[],
            )
            .await?;
        self.bet_repo.mark_completed(&mut tx, bet_id).await?;

        tx.commit().await?;

        info!(bet_id, staked = %total_staked, "Loss applied");

        Ok(SettlementOutcome {
            bet_id,
            result_id,
            result_type: ResultType::Loss,
            winning_team: None,
            profit_amount: None,
            loss_amount: Some(total_staked),
            accounts: Vec::new(),
        })
    }

    /// Credit negotiated amounts to a subset of the bet's accounts and close
    /// the bet. Every credit and the result row commit in the one
    /// transaction; there is no partially-applied intermediate state.
    ///
    /// Amounts are deliberately not checked against stakes: zero and excess
    /// cashouts are accepted.
    async fn settle_cashout(
        &self,
        bet_id: i64,
        entries: Vec<CashoutEntry>,
    ) -> AppResult<SettlementOutcome> {
        info!(bet_id, entries = entries.len(), "Settling bet as cashout");

        for entry in &entries {
            if entry.amount < Decimal::ZERO {
                return Err(AppError::InvalidInput(format!(
                    "cashout amount for account {} must not be negative, got {}",
                    entry.account_id, entry.amount
                )));
            }
        }
        let unique: HashSet<_> = entries.iter().map(|e| e.account_id).collect();
        if unique.len() != entries.len() {
            return Err(AppError::InvalidInput(
                "duplicate account in cashout entries".into(),
            ));
        }

        let mut tx = self.begin().await?;
        self.fetch_active_bet(&mut tx, bet_id).await?;
        let allocations = self.bet_repo.allocations_in_tx(&mut tx, bet_id).await?;

        let staked_accounts: HashSet<i64> =
            allocations.iter().map(|a| a.account_id).collect();
        let mut accounts = Vec::with_capacity(entries.len());
        for entry in &entries {
            if !staked_accounts.contains(&entry.account_id) {
                return Err(AppError::NotFound(format!(
                    "account {} has no stake on bet {}",
                    entry.account_id, bet_id
                )));
            }
            let updated = self
                .account_repo
                .credit(&mut tx, entry.account_id, entry.amount)
                .await?;
            accounts.push(updated);
        }

        let result_id = self
            .result_repo
            .insert(&mut tx, bet_id, None, ResultType::Cashout, None, None, &entries)
            .await?;
        self.bet_repo.mark_completed(&mut tx, bet_id).await?;

        tx.commit().await?;

        info!(bet_id, "Cashout applied");

        Ok(SettlementOutcome {
            bet_id,
            result_id,
            result_type: ResultType::Cashout,
            winning_team: None,
            profit_amount: None,
            loss_amount: None,
            accounts,
        })
    }

    /// Open the settlement transaction with the write lock held up front
    async fn begin(&self) -> AppResult<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
    }

    /// Fetch the bet and enforce the single `active -> completed` transition
    async fn fetch_active_bet(
        &self,
        tx: &mut Transaction<'static, Sqlite>,
        bet_id: i64,
    ) -> AppResult<Bet> {
        let bet = self
            .bet_repo
            .find_by_id_in_tx(tx, bet_id)
            .await?
            .ok_or(AppError::BetNotFound(bet_id))?;

        if !bet.is_active() {
            return Err(AppError::BetAlreadySettled(bet_id));
        }

        Ok(bet)
    }
}
