//! The local key-value store that holds the session and every user's transactions.
//!
//! Values are opaque strings. Callers are expected to namespace their keys with `Keys`.

mod memory;
mod migrations;
mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

/// Asynchronous string key-value storage.
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// Returns the value stored under `key`, or `None` if there is none.
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;

    /// Deletes `key`. Removing a key that does not exist is not an error.
    async fn remove(&self, key: &str) -> anyhow::Result<()>;
}

/// Builds the storage keys used by the app, all under a common prefix such as `@gofinances`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Keys {
    prefix: String,
}

impl Keys {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Where the signed-in user's session is kept, e.g. `@gofinances:user`.
    pub fn user(&self) -> String {
        format!("{}:user", self.prefix)
    }

    /// Where a user's transaction list is kept, e.g. `@gofinances:transactions_user:42`.
    pub fn transactions(&self, user_id: &str) -> String {
        format!("{}:transactions_user:{user_id}", self.prefix)
    }
}

#[test]
fn test_keys() {
    let keys = Keys::new("@gofinances");
    assert_eq!(keys.user(), "@gofinances:user");
    assert_eq!(keys.transactions("42"), "@gofinances:transactions_user:42");
}
