//! Implements the `Storage` trait with an in-memory map. Used by tests.

use crate::storage::Storage;
use anyhow::bail;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    data: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// When `fail` is true, every `set` and `remove` returns an error and leaves the data as is.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> anyhow::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("The storage is not writable");
        }
        Ok(())
    }

    fn lock(&self) -> anyhow::Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.data
            .lock()
            .map_err(|_| anyhow::anyhow!("The in-memory storage lock is poisoned"))
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.check_writable()?;
        let _ = self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.check_writable()?;
        let _ = self.lock()?.remove(key);
        Ok(())
    }
}

#[tokio::test]
async fn test_memory_storage_fail_writes() {
    let storage = MemoryStorage::new();
    storage.set("k", "v").await.unwrap();
    storage.fail_writes(true);
    assert!(storage.set("k", "w").await.is_err());
    assert!(storage.remove("k").await.is_err());
    assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("v"));
}
