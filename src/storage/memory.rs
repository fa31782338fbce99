use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};

use super::KeyValueStore;

/// In-process key/value store. Clones share the same map, so a ledger can be
/// reopened over data written by another instance.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn set_many(&self, batch: &[(&str, Vec<u8>)]) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        for (key, value) in batch {
            entries.insert((*key).to_string(), value.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_key() {
        let store = MemoryStore::new();
        assert_eq!(store.get("allowance").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = MemoryStore::new();
        store.set("allowance", b"100").await.unwrap();
        store.set("allowance", b"250").await.unwrap();

        assert_eq!(store.get("allowance").await.unwrap(), Some(b"250".to_vec()));
    }

    #[tokio::test]
    async fn test_set_many_writes_every_entry() {
        let store = MemoryStore::new();
        store.set("allowance", b"1").await.unwrap();
        store
            .set_many(&[("allowance", b"2".to_vec()), ("rewards", b"[]".to_vec())])
            .await
            .unwrap();

        assert_eq!(store.get("allowance").await.unwrap(), Some(b"2".to_vec()));
        assert_eq!(store.get("rewards").await.unwrap(), Some(b"[]".to_vec()));
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("rewards", b"[]").await.unwrap();

        assert_eq!(other.get("rewards").await.unwrap(), Some(b"[]".to_vec()));
    }
}
