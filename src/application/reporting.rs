use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Category, Cents, LedgerState, Transaction, saturate};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: Category,
    pub total: Cents,
    pub count: usize,
    /// Share of all expenses, 0-100
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub allowance: Cents,
    pub total_income: Cents,
    pub total_expense: Cents,
    pub balance: Cents,
    pub reward_count: usize,
    /// Sum of progress across all reward goals
    pub reserved_in_rewards: Cents,
}

/// Expense totals grouped by category, largest first.
pub fn spending_by_category(transactions: &[Transaction]) -> Vec<CategorySummary> {
    let mut groups: BTreeMap<Category, (i128, usize)> = BTreeMap::new();
    for tx in transactions.iter().filter(|t| !t.is_income()) {
        let entry = groups.entry(tx.category).or_insert((0, 0));
        entry.0 += i128::from(tx.amount_cents);
        entry.1 += 1;
    }

    let grand_total: i128 = groups.values().map(|(total, _)| total).sum();

    let mut summaries: Vec<CategorySummary> = groups
        .into_iter()
        .map(|(category, (total, count))| CategorySummary {
            category,
            total: saturate(total),
            count,
            percentage: if grand_total > 0 {
                total as f64 / grand_total as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect();

    summaries.sort_by(|a, b| b.total.cmp(&a.total).then(a.category.cmp(&b.category)));
    summaries
}

pub fn summarize(state: &LedgerState) -> LedgerSummary {
    let (total_income, total_expense) =
        state
            .transactions
            .iter()
            .fold((0i128, 0i128), |(income, expense), tx| {
                if tx.is_income() {
                    (income + i128::from(tx.amount_cents), expense)
                } else {
                    (income, expense + i128::from(tx.amount_cents))
                }
            });
    let reserved: i128 = state
        .rewards
        .iter()
        .map(|r| i128::from(r.progress_cents))
        .sum();

    LedgerSummary {
        allowance: state.allowance,
        total_income: saturate(total_income),
        total_expense: saturate(total_expense),
        balance: state.balance(),
        reward_count: state.rewards.len(),
        reserved_in_rewards: saturate(reserved),
    }
}
