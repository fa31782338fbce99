use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::LedgerStore;
use crate::domain::{Cents, RewardGoal, Transaction, format_cents};
use crate::storage::KeyValueStore;

/// Full ledger snapshot for JSON export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub allowance: Cents,
    pub balance: Cents,
    pub transactions: Vec<Transaction>,
    pub rewards: Vec<RewardGoal>,
    pub last_reset_date: DateTime<Utc>,
}

/// Writes ledger data out as CSV or JSON
pub struct Exporter<'a, S> {
    store: &'a LedgerStore<S>,
}

impl<'a, S: KeyValueStore> Exporter<'a, S> {
    pub fn new(store: &'a LedgerStore<S>) -> Self {
        Self { store }
    }

    /// Export transactions to CSV, oldest first
    pub fn export_transactions_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let mut transactions: Vec<&Transaction> = self.store.transactions().iter().collect();
        transactions.sort_by_key(|t| t.date);

        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["id", "date", "kind", "category", "amount", "reason"])?;

        for tx in &transactions {
            csv_writer.write_record([
                tx.id.to_string(),
                tx.date.to_rfc3339(),
                tx.kind.to_string(),
                tx.category.to_string(),
                format_cents(tx.amount_cents),
                tx.reason.clone(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(transactions.len())
    }

    /// Export reward goals to CSV in priority order
    pub fn export_rewards_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["priority", "id", "title", "goal", "progress"])?;

        for reward in self.store.rewards() {
            csv_writer.write_record([
                reward.priority.to_string(),
                reward.id.to_string(),
                reward.title.clone(),
                format_cents(reward.goal_cents),
                format_cents(reward.progress_cents),
            ])?;
        }

        csv_writer.flush()?;
        Ok(self.store.rewards().len())
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        let state = self.store.state();
        LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            allowance: state.allowance,
            balance: self.store.current_balance(),
            transactions: state.transactions.clone(),
            rewards: state.rewards.clone(),
            last_reset_date: state.last_reset_date,
        }
    }

    /// Export the whole ledger as pretty-printed JSON
    pub fn export_json<W: Write>(&self, mut writer: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut writer, &self.snapshot())?;
        writeln!(writer)?;
        Ok(())
    }
}
