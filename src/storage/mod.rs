use std::future::Future;

use anyhow::Result;

mod memory;
mod repository;

pub use memory::*;
pub use repository::*;

/// SQL migration for the key/value table
pub const MIGRATION_001_KV: &str = include_str!("migrations/001_kv.sql");

pub const KEY_TRANSACTIONS: &str = "transactions";
pub const KEY_REWARDS: &str = "rewards";
pub const KEY_ALLOWANCE: &str = "allowance";
pub const KEY_LAST_RESET_DATE: &str = "lastResetDate";

/// Durable key/value storage the ledger persists itself into.
/// Values are opaque byte blobs; the ledger decides their encoding.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

    fn set(&self, key: &str, value: &[u8]) -> impl Future<Output = Result<()>> + Send;

    /// Write several keys as one unit: either every entry is stored or none is.
    fn set_many(&self, entries: &[(&str, Vec<u8>)]) -> impl Future<Output = Result<()>> + Send;
}
