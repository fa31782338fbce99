use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use super::{Cents, RewardGoal, Transaction};

/// Everything the ledger owns. The balance is not stored here; it is always
/// derived with [`compute_balance`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    pub allowance: Cents,
    pub transactions: Vec<Transaction>,
    pub rewards: Vec<RewardGoal>,
    pub last_reset_date: DateTime<Utc>,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self {
            allowance: 0,
            transactions: Vec::new(),
            rewards: Vec::new(),
            last_reset_date: Utc::now(),
        }
    }
}

impl LedgerState {
    pub fn balance(&self) -> Cents {
        compute_balance(self.allowance, &self.transactions)
    }
}

/// Balance = allowance + sum of income - sum of expenses.
/// Summed in i128 and saturated to the `Cents` range.
pub fn compute_balance(allowance: Cents, transactions: &[Transaction]) -> Cents {
    let total = transactions
        .iter()
        .fold(i128::from(allowance), |balance, tx| {
            balance + i128::from(tx.signed_amount())
        });
    saturate(total)
}

/// Clamp a wide sum back into `Cents`.
pub fn saturate(total: i128) -> Cents {
    Cents::try_from(total).unwrap_or(if total > 0 { Cents::MAX } else { Cents::MIN })
}

/// Priority for a newly added reward: one past the current maximum.
pub fn next_priority(rewards: &[RewardGoal]) -> i64 {
    rewards.iter().map(|r| r.priority).max().unwrap_or(0) + 1
}

/// Order rewards by ascending priority. The sort is stable, so equal
/// priorities keep their insertion order.
pub fn sort_by_priority(rewards: &mut [RewardGoal]) {
    rewards.sort_by_key(|r| r.priority);
}

/// True when `now` falls on the first day of a month and on a different
/// calendar day than the last recorded reset.
pub fn is_rollover_day(last_reset: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    last_reset.date_naive() != now.date_naive() && now.day() == 1
}
