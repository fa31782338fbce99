// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, Utc};
use pocketbook::application::LedgerStore;
use pocketbook::domain::{Category, Cents, RewardGoal, TransactionKind};
use pocketbook::storage::{KeyValueStore, MemoryStore, SqliteStore};
use tempfile::TempDir;

/// Helper to create a ledger over a fresh in-memory store
pub async fn test_store() -> LedgerStore<MemoryStore> {
    LedgerStore::open(MemoryStore::new()).await
}

/// Helper to create a ledger over a temporary SQLite database.
/// Returns the database path so the test can reopen it.
pub async fn sqlite_store() -> Result<(LedgerStore<SqliteStore>, TempDir, String)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir
        .path()
        .join("ledger.db")
        .to_str()
        .ok_or_else(|| anyhow!("non-utf8 temp path"))?
        .to_string();
    let storage = SqliteStore::open_path(&db_path).await?;
    Ok((LedgerStore::open(storage).await, temp_dir, db_path))
}

/// Helper to parse a date string into DateTime<Utc>
pub fn parse_date(date_str: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
        .and_utc()
}

/// Store whose reads succeed (empty) but whose writes always fail
#[derive(Debug, Default, Clone)]
pub struct ReadOnlyStore;

impl KeyValueStore for ReadOnlyStore {
    async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }

    async fn set(&self, key: &str, _value: &[u8]) -> Result<()> {
        Err(anyhow!("disk full while writing '{}'", key))
    }

    async fn set_many(&self, entries: &[(&str, Vec<u8>)]) -> Result<()> {
        Err(anyhow!("disk full while writing {} keys", entries.len()))
    }
}

/// Store whose reads always fail
#[derive(Debug, Default, Clone)]
pub struct UnreadableStore;

impl KeyValueStore for UnreadableStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Err(anyhow!("cannot read '{}'", key))
    }

    async fn set(&self, _key: &str, _value: &[u8]) -> Result<()> {
        Ok(())
    }

    async fn set_many(&self, _entries: &[(&str, Vec<u8>)]) -> Result<()> {
        Ok(())
    }
}

/// Wraps a `MemoryStore` and, once armed, rejects any write touching `failing_key`.
/// Batches are checked before anything is written, like a rolled-back transaction.
#[derive(Debug, Clone)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    failing_key: &'static str,
    armed: Arc<AtomicBool>,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore, failing_key: &'static str) -> Self {
        Self {
            inner,
            failing_key,
            armed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    fn rejects(&self, key: &str) -> bool {
        self.armed.load(Ordering::SeqCst) && key == self.failing_key
    }
}

impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        if self.rejects(key) {
            return Err(anyhow!("write to '{}' failed", key));
        }
        self.inner.set(key, value).await
    }

    async fn set_many(&self, entries: &[(&str, Vec<u8>)]) -> Result<()> {
        if let Some((key, _)) = entries.iter().find(|(key, _)| self.rejects(key)) {
            return Err(anyhow!("write to '{}' failed", key));
        }
        self.inner.set_many(entries).await
    }
}

/// Test fixture: the allowance/paycheck/bike walkthrough
pub struct Fixtures;

impl Fixtures {
    /// allowance 100.00, one "Bike" reward with a 200.00 goal
    pub async fn with_bike<S: KeyValueStore>(store: &mut LedgerStore<S>) -> RewardGoal {
        store.set_allowance(10000).await;
        store.add_reward("Bike", 20000).await
    }

    pub async fn income<S: KeyValueStore>(store: &mut LedgerStore<S>, amount: Cents) {
        store
            .add_transaction(
                amount,
                "paycheck",
                TransactionKind::Income,
                Category::RewardDeposit,
                None,
            )
            .await;
    }

    pub async fn expense<S: KeyValueStore>(
        store: &mut LedgerStore<S>,
        amount: Cents,
        category: Category,
    ) {
        store
            .add_transaction(amount, "spent", TransactionKind::Expense, category, None)
            .await;
    }
}
