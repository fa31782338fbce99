use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Cents;

pub type TransactionId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in (pocket money, gifts, paychecks)
    Income,
    /// Money going out, including deposits into rewards
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "income" => Some(TransactionKind::Income),
            "expense" => Some(TransactionKind::Expense),
            _ => None,
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Food,
    Clothing,
    Transport,
    Entertainment,
    /// Income entries and money moved into a reward goal
    RewardDeposit,
    Misc,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Food,
        Category::Clothing,
        Category::Transport,
        Category::Entertainment,
        Category::RewardDeposit,
        Category::Misc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Clothing => "clothing",
            Category::Transport => "transport",
            Category::Entertainment => "entertainment",
            Category::RewardDeposit => "reward_deposit",
            Category::Misc => "misc",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "food" => Some(Category::Food),
            "clothing" => Some(Category::Clothing),
            "transport" => Some(Category::Transport),
            "entertainment" => Some(Category::Entertainment),
            "reward_deposit" | "rewarddeposit" => Some(Category::RewardDeposit),
            "misc" => Some(Category::Misc),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single income or expense entry. Transactions are never edited after creation;
/// they are only deleted individually or cleared all at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// Amount in cents. Callers are expected to pass positive values.
    pub amount_cents: Cents,
    pub reason: String,
    pub kind: TransactionKind,
    pub category: Category,
    /// When the transaction happened (defaults to creation time)
    pub date: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        amount_cents: Cents,
        reason: impl Into<String>,
        kind: TransactionKind,
        category: Category,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount_cents,
            reason: reason.into(),
            kind,
            category,
            date,
        }
    }

    /// Contribution of this entry to the balance.
    pub fn signed_amount(&self) -> Cents {
        match self.kind {
            TransactionKind::Income => self.amount_cents,
            TransactionKind::Expense => self.amount_cents.saturating_neg(),
        }
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionKind::Income
    }
}
