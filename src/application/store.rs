use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::domain::{
    Category, Cents, LedgerState, RewardGoal, RewardId, Transaction, TransactionId,
    TransactionKind, compute_balance, format_cents, is_rollover_day, next_priority,
    sort_by_priority,
};
use crate::storage::{
    KEY_ALLOWANCE, KEY_LAST_RESET_DATE, KEY_REWARDS, KEY_TRANSACTIONS, KeyValueStore,
};

use super::{AppError, LedgerSummary, summarize};

/// Result of moving money from the balance into a reward goal.
/// Rejections are reported here instead of as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositOutcome {
    pub success: bool,
    pub message: String,
}

impl DepositOutcome {
    fn accepted(message: String) -> Self {
        Self {
            success: true,
            message,
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Owns the allowance, transactions and reward goals, and keeps the persisted
/// snapshot in step with them.
///
/// Every mutation is applied in memory first and then written through the
/// injected [`KeyValueStore`]. A failed write is logged and otherwise ignored:
/// the in-memory state stays authoritative for the rest of the process.
pub struct LedgerStore<S> {
    storage: S,
    state: LedgerState,
}

impl<S: KeyValueStore> LedgerStore<S> {
    /// Load the ledger from `storage` and run the monthly rollover check.
    pub async fn open(storage: S) -> Self {
        Self::open_at(storage, Utc::now()).await
    }

    /// Same as [`LedgerStore::open`] with an explicit current time.
    pub async fn open_at(storage: S, now: DateTime<Utc>) -> Self {
        let state = Self::load_state(&storage, now).await;
        let mut store = Self { storage, state };
        store.check_and_reset_at(now).await;
        store
    }

    async fn load_state(storage: &S, now: DateTime<Utc>) -> LedgerState {
        let transactions: Vec<Transaction> = load_key(storage, KEY_TRANSACTIONS)
            .await
            .unwrap_or_default();
        let mut rewards: Vec<RewardGoal> = load_key(storage, KEY_REWARDS).await.unwrap_or_default();
        let allowance: Cents = load_key(storage, KEY_ALLOWANCE).await.unwrap_or(0);
        let last_reset_date = load_key(storage, KEY_LAST_RESET_DATE)
            .await
            .unwrap_or(now);

        sort_by_priority(&mut rewards);

        debug!(
            transactions = transactions.len(),
            rewards = rewards.len(),
            allowance,
            "Loaded ledger"
        );

        LedgerState {
            allowance,
            transactions,
            rewards,
            last_reset_date,
        }
    }

    // ========================
    // Persistence
    // ========================

    /// Write the full state to storage in a single batch, so a failed write
    /// never leaves some keys updated and others stale.
    pub async fn save(&self) -> Result<(), AppError> {
        let entries = [
            (KEY_TRANSACTIONS, serde_json::to_vec(&self.state.transactions)?),
            (KEY_REWARDS, serde_json::to_vec(&self.state.rewards)?),
            (KEY_ALLOWANCE, serde_json::to_vec(&self.state.allowance)?),
            (
                KEY_LAST_RESET_DATE,
                serde_json::to_vec(&self.state.last_reset_date)?,
            ),
        ];

        self.storage.set_many(&entries).await?;
        Ok(())
    }

    async fn persist(&self) {
        if let Err(err) = self.save().await {
            warn!(error = %err, "Failed to persist ledger, keeping in-memory state");
        }
    }

    // ========================
    // Queries
    // ========================

    /// Allowance plus income minus expenses, recomputed on every call.
    pub fn current_balance(&self) -> Cents {
        compute_balance(self.state.allowance, &self.state.transactions)
    }

    pub fn allowance(&self) -> Cents {
        self.state.allowance
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.state.transactions
    }

    pub fn transaction(&self, id: TransactionId) -> Option<&Transaction> {
        self.state.transactions.iter().find(|t| t.id == id)
    }

    /// Reward goals in ascending priority order.
    pub fn rewards(&self) -> &[RewardGoal] {
        &self.state.rewards
    }

    pub fn reward(&self, id: RewardId) -> Option<&RewardGoal> {
        self.state.rewards.iter().find(|r| r.id == id)
    }

    pub fn last_reset_date(&self) -> DateTime<Utc> {
        self.state.last_reset_date
    }

    pub fn summary(&self) -> LedgerSummary {
        summarize(&self.state)
    }

    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Map positions in the priority-sorted reward list to reward ids.
    /// Positions past the end are skipped.
    pub fn reward_ids_at(&self, positions: &[usize]) -> Vec<RewardId> {
        positions
            .iter()
            .filter_map(|&pos| self.state.rewards.get(pos).map(|r| r.id))
            .collect()
    }

    // ========================
    // Transactions
    // ========================

    /// Record a transaction. `date` defaults to now.
    ///
    /// Amount and reason are not validated here: callers must pass a positive
    /// amount and a non-empty reason.
    pub async fn add_transaction(
        &mut self,
        amount_cents: Cents,
        reason: impl Into<String>,
        kind: TransactionKind,
        category: Category,
        date: Option<DateTime<Utc>>,
    ) -> Transaction {
        let tx = Transaction::new(
            amount_cents,
            reason,
            kind,
            category,
            date.unwrap_or_else(Utc::now),
        );
        self.state.transactions.push(tx.clone());
        debug!(id = %tx.id, amount = amount_cents, kind = %kind, "Added transaction");

        self.persist().await;
        tx
    }

    /// Remove a transaction. Returns false when no transaction has that id.
    pub async fn delete_transaction(&mut self, id: TransactionId) -> bool {
        let before = self.state.transactions.len();
        self.state.transactions.retain(|t| t.id != id);
        if self.state.transactions.len() == before {
            return false;
        }
        debug!(%id, "Deleted transaction");

        self.persist().await;
        true
    }

    pub async fn clear_all_transactions(&mut self) {
        let removed = self.state.transactions.len();
        self.state.transactions.clear();
        debug!(removed, "Cleared all transactions");

        self.persist().await;
    }

    pub async fn set_allowance(&mut self, amount_cents: Cents) {
        self.state.allowance = amount_cents;
        debug!(allowance = amount_cents, "Set allowance");

        self.persist().await;
    }

    // ========================
    // Rewards
    // ========================

    /// Add a reward goal after all existing ones (priority = max + 1).
    pub async fn add_reward(&mut self, title: impl Into<String>, goal_cents: Cents) -> RewardGoal {
        let reward = RewardGoal::new(title, goal_cents, next_priority(&self.state.rewards));
        self.state.rewards.push(reward.clone());
        sort_by_priority(&mut self.state.rewards);
        debug!(id = %reward.id, priority = reward.priority, "Added reward");

        self.persist().await;
        reward
    }

    /// Add `delta_cents` to a reward's progress. Progress is not capped at the
    /// goal. Returns false when no reward has that id.
    pub async fn update_reward_progress(&mut self, id: RewardId, delta_cents: Cents) -> bool {
        let Some(reward) = self.state.rewards.iter_mut().find(|r| r.id == id) else {
            return false;
        };
        reward.progress_cents = reward.progress_cents.saturating_add(delta_cents);
        debug!(%id, progress = reward.progress_cents, "Updated reward progress");

        self.persist().await;
        true
    }

    /// Delete rewards by id. Unknown ids are ignored. Returns how many were removed.
    pub async fn delete_rewards(&mut self, ids: &[RewardId]) -> usize {
        let before = self.state.rewards.len();
        self.state.rewards.retain(|r| !ids.contains(&r.id));
        let removed = before - self.state.rewards.len();
        if removed == 0 {
            return 0;
        }
        debug!(removed, "Deleted rewards");

        self.persist().await;
        removed
    }

    /// Move `amount_cents` from the balance into a reward's progress.
    ///
    /// The deposit is recorded as a `RewardDeposit` expense and the reward is
    /// credited in the same step; on rejection nothing changes.
    pub async fn deposit_to_reward(&mut self, id: RewardId, amount_cents: Cents) -> DepositOutcome {
        if amount_cents <= 0 {
            return DepositOutcome::rejected("Deposit amount must be positive.");
        }

        let balance = self.current_balance();
        if amount_cents > balance {
            return DepositOutcome::rejected(format!(
                "Insufficient balance. Current balance: {}, attempted deposit: {}.",
                format_cents(balance),
                format_cents(amount_cents)
            ));
        }

        let Some(index) = self.state.rewards.iter().position(|r| r.id == id) else {
            return DepositOutcome::rejected("Selected reward not found.");
        };

        let title = self.state.rewards[index].title.clone();
        self.state.transactions.push(Transaction::new(
            amount_cents,
            format!("Deposited Reward: {}", title),
            TransactionKind::Expense,
            Category::RewardDeposit,
            Utc::now(),
        ));
        let reward = &mut self.state.rewards[index];
        reward.progress_cents = reward.progress_cents.saturating_add(amount_cents);

        let new_balance = self.current_balance();
        debug!(%id, amount = amount_cents, balance = new_balance, "Deposited to reward");

        self.persist().await;

        DepositOutcome::accepted(format!(
            "Deposited {} to '{}'. New balance: {}.",
            format_cents(amount_cents),
            title,
            format_cents(new_balance)
        ))
    }

    // ========================
    // Period rollover
    // ========================

    /// Monthly rollover hook. When `now` is the first of a month and a different
    /// day than the last reset, records `now` as the reset date and persists.
    /// Allowance and transactions are left untouched. Returns whether it fired.
    pub async fn check_and_reset_at(&mut self, now: DateTime<Utc>) -> bool {
        if !is_rollover_day(self.state.last_reset_date, now) {
            return false;
        }
        self.state.last_reset_date = now;
        info!(date = %now.date_naive(), "Allowance period rolled over");

        self.persist().await;
        true
    }
}

/// Read and decode one key. Missing, unreadable and undecodable values all yield `None`.
async fn load_key<S: KeyValueStore, T: DeserializeOwned>(storage: &S, key: &str) -> Option<T> {
    match storage.get(key).await {
        Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key, error = %err, "Discarding undecodable stored value");
                None
            }
        },
        Ok(None) => None,
        Err(err) => {
            warn!(key, error = %err, "Failed to read from storage");
            None
        }
    }
}
