use crate::error::{AppError, AppResult, BalanceShortfall};
use crate::models::{
    Account, BetDetail, BetSummary, HistoricalBet, Match, Settings, Side,
};
use crate::repositories::{
    AccountRepository, BetRepository, MatchRepository, ResultRepository, SettingsRepository,
};
use crate::stake::compute_stake;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

/// The match a bet is placed against: an existing row, or a new pairing
/// created inside the same transaction as the bet.
#[derive(Debug, Clone)]
pub enum MatchRef {
    Existing(i64),
    New {
        team1: String,
        team2: String,
        match_date: NaiveDate,
        match_time: String,
    },
}

/// Request to create a bet splitting `betting_value` across two outcomes.
///
/// Per-side stakes may be supplied pre-computed; otherwise they are derived
/// from the betting value and each side's odds (`exact_stakes` false rounds
/// up to whole units).
#[derive(Debug, Clone)]
pub struct CreateBetRequest {
    pub match_ref: MatchRef,
    pub team1_odds: Decimal,
    pub team2_odds: Decimal,
    pub betting_value: Decimal,
    pub accounts1: Vec<i64>,
    pub accounts2: Vec<i64>,
    pub stake1: Option<Decimal>,
    pub stake2: Option<Decimal>,
    pub exact_stakes: bool,
}

/// Outcome of a successful bet creation
#[derive(Debug, Clone)]
pub struct CreatedBet {
    pub bet_id: i64,
    pub match_id: i64,
    pub stake1: Decimal,
    pub stake2: Decimal,
    /// Post-transaction snapshots of every debited account
    pub accounts: Vec<Account>,
}

/// Service for creating bets and reading ledger state
pub struct BettingService {
    pool: SqlitePool,
    account_repo: Arc<AccountRepository>,
    match_repo: Arc<MatchRepository>,
    bet_repo: Arc<BetRepository>,
    result_repo: Arc<ResultRepository>,
    settings_repo: Arc<SettingsRepository>,
    enforce_balanced_sides: bool,
}

impl BettingService {
    pub fn new(
        pool: SqlitePool,
        account_repo: Arc<AccountRepository>,
        match_repo: Arc<MatchRepository>,
        bet_repo: Arc<BetRepository>,
        result_repo: Arc<ResultRepository>,
        settings_repo: Arc<SettingsRepository>,
        enforce_balanced_sides: bool,
    ) -> Self {
        Self {
            pool,
            account_repo,
            match_repo,
            bet_repo,
            result_repo,
            settings_repo,
            enforce_balanced_sides,
        }
    }

    /// Place a bet: create the match if needed, write the bet and one
    /// allocation per account per side, and debit every account, all in one
    /// transaction.
    ///
    /// Validation failures surface before any write; a storage failure rolls
    /// the whole transaction back.
    pub async fn create_bet(&self, request: CreateBetRequest) -> AppResult<CreatedBet> {
        info!(
            betting_value = %request.betting_value,
            side1 = request.accounts1.len(),
            side2 = request.accounts2.len(),
            "Placing bet"
        );

        // Both sides need accounts
        if request.accounts1.is_empty() && request.accounts2.is_empty() {
            return Err(AppError::MissingAccounts("both sides".into()));
        }
        if request.accounts1.is_empty() {
            return Err(AppError::MissingAccounts("side 1".into()));
        }
        if request.accounts2.is_empty() {
            return Err(AppError::MissingAccounts("side 2".into()));
        }

        let side2_ids: HashSet<_> = request.accounts2.iter().copied().collect();
        let mut overlap: Vec<i64> = request
            .accounts1
            .iter()
            .copied()
            .filter(|id| side2_ids.contains(id))
            .collect();
        if !overlap.is_empty() {
            overlap.sort_unstable();
            return Err(AppError::AccountOnBothSides(overlap));
        }

        // Equal-count policy (configurable)
        if self.enforce_balanced_sides && request.accounts1.len() != request.accounts2.len() {
            return Err(AppError::UnbalancedSides {
                side1: request.accounts1.len(),
                side2: request.accounts2.len(),
            });
        }

        // No account may appear twice within a side
        for (label, ids) in [("side 1", &request.accounts1), ("side 2", &request.accounts2)] {
            let unique: HashSet<_> = ids.iter().collect();
            if unique.len() != ids.len() {
                return Err(AppError::InvalidInput(format!(
                    "duplicate account on {}",
                    label
                )));
            }
        }

        // Per-side stakes: supplied, or derived from value and odds
        let stake1 = match request.stake1 {
            Some(stake) => positive_stake(stake, "side 1")?,
            None => compute_stake(request.betting_value, request.team1_odds, request.exact_stakes)?,
        };
        let stake2 = match request.stake2 {
            Some(stake) => positive_stake(stake, "side 2")?,
            None => compute_stake(request.betting_value, request.team2_odds, request.exact_stakes)?,
        };
        // Odds are validated by compute_stake when stakes are derived;
        // supplied stakes still need sane odds for settlement later.
        if request.team1_odds <= Decimal::ZERO || request.team2_odds <= Decimal::ZERO {
            return Err(AppError::InvalidInput("odds must be positive".into()));
        }
        if request.betting_value <= Decimal::ZERO {
            return Err(AppError::InvalidInput("betting value must be positive".into()));
        }

        // Single transaction: validation reads and every write share it.
        // BEGIN IMMEDIATE takes the write lock up front so a racing creation
        // re-reads committed balances instead of losing an update.
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        // Check every account before rejecting so the caller sees all
        // shortfalls at once
        let mut shortfalls: Vec<BalanceShortfall> = Vec::new();
        for (ids, stake) in [(&request.accounts1, stake1), (&request.accounts2, stake2)] {
            for &account_id in ids.iter() {
                let account = self
                    .account_repo
                    .fetch_in_tx(&mut tx, account_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("account {}", account_id)))?;

                if !account.can_cover(stake) {
                    shortfalls.push(BalanceShortfall {
                        account_id,
                        required: stake,
                        available: account.balance,
                    });
                }
            }
        }
        if !shortfalls.is_empty() {
            return Err(AppError::InsufficientBalance(shortfalls));
        }

        // Match: reuse an existing row or create the pairing here, inside
        // the same transaction as the bet
        let match_id = match &request.match_ref {
            MatchRef::Existing(id) => {
                self.match_repo
                    .find_by_id_in_tx(&mut tx, *id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("match {}", id)))?;
                *id
            }
            MatchRef::New {
                team1,
                team2,
                match_date,
                match_time,
            } => {
                self.match_repo
                    .insert(&mut tx, team1, team2, *match_date, match_time)
                    .await?
            }
        };

        let bet_id = self
            .bet_repo
            .insert(
                &mut tx,
                match_id,
                request.team1_odds,
                request.team2_odds,
                request.betting_value,
            )
            .await?;

        let mut accounts = Vec::with_capacity(request.accounts1.len() + request.accounts2.len());
        for (side, ids, stake) in [
            (Side::One, &request.accounts1, stake1),
            (Side::Two, &request.accounts2, stake2),
        ] {
            for &account_id in ids.iter() {
                self.bet_repo
                    .insert_allocation(&mut tx, bet_id, account_id, side, stake)
                    .await?;
                let updated = self.account_repo.debit(&mut tx, account_id, stake).await?;
                accounts.push(updated);
            }
        }

        tx.commit().await?;

        info!(bet_id, match_id, %stake1, %stake2, "Bet created");

        Ok(CreatedBet {
            bet_id,
            match_id,
            stake1,
            stake2,
            accounts,
        })
    }

    /// List all active accounts
    pub async fn list_accounts(&self) -> AppResult<Vec<Account>> {
        Ok(self.account_repo.list_active().await?)
    }

    /// Create or update an account (administrative edit)
    pub async fn save_account(&self, mut account: Account) -> AppResult<Account> {
        if account.account_id <= 0 {
            return Err(AppError::InvalidInput(format!(
                "account id must be positive, got {}",
                account.account_id
            )));
        }
        if account.balance < Decimal::ZERO {
            return Err(AppError::InvalidInput(format!(
                "balance must not be negative, got {}",
                account.balance
            )));
        }
        if account.name.trim().is_empty() {
            account.name = format!("Account {}", account.account_id);
        }

        let saved = self.account_repo.save(&account).await?;
        info!(account_id = saved.account_id, balance = %saved.balance, "Account saved");
        Ok(saved)
    }

    /// Create a match explicitly, for reuse across multiple bets
    pub async fn create_match(
        &self,
        team1: &str,
        team2: &str,
        match_date: NaiveDate,
        match_time: &str,
    ) -> AppResult<Match> {
        if team1.trim().is_empty() || team2.trim().is_empty() {
            return Err(AppError::InvalidInput("team names must not be empty".into()));
        }

        Ok(self
            .match_repo
            .create(team1, team2, match_date, match_time)
            .await?)
    }

    /// All active bets with match info
    pub async fn list_active_bets(&self) -> AppResult<Vec<BetSummary>> {
        Ok(self.bet_repo.list_active().await?)
    }

    /// Full detail of one bet
    pub async fn bet_detail(&self, bet_id: i64) -> AppResult<BetDetail> {
        self.bet_repo
            .detail(bet_id)
            .await?
            .ok_or(AppError::BetNotFound(bet_id))
    }

    /// Completed bets with results and allocation detail
    pub async fn history(&self) -> AppResult<Vec<HistoricalBet>> {
        let completed = self.result_repo.completed_with_results().await?;

        let mut history = Vec::with_capacity(completed.len());
        for (bet, result) in completed {
            let accounts = self.bet_repo.allocation_details(bet.bet_id).await?;
            history.push(HistoricalBet {
                bet,
                result,
                accounts,
            });
        }

        Ok(history)
    }

    /// Get the settings record
    pub async fn get_settings(&self) -> AppResult<Settings> {
        Ok(self.settings_repo.get().await?)
    }

    /// Save the settings record
    pub async fn save_settings(&self, settings: Settings) -> AppResult<Settings> {
        if settings.min_transfer <= Decimal::ZERO {
            return Err(AppError::InvalidInput(format!(
                "minimum transfer must be positive, got {}",
                settings.min_transfer
            )));
        }
        if settings.default_betting_value <= Decimal::ZERO {
            return Err(AppError::InvalidInput(format!(
                "default betting value must be positive, got {}",
                settings.default_betting_value
            )));
        }

        let saved = self.settings_repo.save(&settings).await?;
        info!("Settings updated");
        Ok(saved)
    }
}

fn positive_stake(stake: Decimal, label: &str) -> AppResult<Decimal> {
    if stake <= Decimal::ZERO {
        return Err(AppError::InvalidInput(format!(
            "stake for {} must be positive, got {}",
            label, stake
        )));
    }
    Ok(stake)
}
