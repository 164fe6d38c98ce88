//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::app::App;
use crate::storage::{MemoryStorage, Storage};
use crate::Config;
use std::sync::Arc;
use tempfile::TempDir;

/// Test environment that sets up a gofinances home directory with a Config, and an in-memory
/// store shared by every `App` it hands out.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
    storage: Arc<MemoryStorage>,
}

impl TestEnv {
    /// Creates a test environment without an OAuth client secret, for use with `Mode::Test`.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("gofinances");
        let config = Config::create(&root, None).await.unwrap();
        Self {
            _temp_dir: temp_dir,
            config,
            storage: Arc::new(MemoryStorage::new()),
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// Creates an `App` over the shared store, restoring whatever session it holds. Calling this
    /// again behaves like restarting the program.
    pub async fn app(&self) -> App {
        App::new(self.config(), self.storage.clone()).await.unwrap()
    }

    /// Overwrites the transactions of `user_id` with something that is not a transaction list.
    pub async fn corrupt_transactions(&self, user_id: &str) {
        self.storage
            .set(&self.config.keys().transactions(user_id), "[{\"id\": 1}]")
            .await
            .unwrap();
    }
}
