//! Reads and appends to a user's persisted transaction list.
//!
//! The list is stored as a JSON array under `Keys::transactions(user_id)`. Appending is a plain
//! read-modify-write of that single key.

use crate::error::{ErrorType, IntoResult, Res};
use crate::model::{locale, Amount, Category, NewTransaction, Transaction, TransactionDate, User};
use crate::storage::{Keys, Storage};
use crate::{utils, Result};
use anyhow::{bail, Context};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Access to the transactions of every user in a `Storage`.
#[derive(Clone)]
pub struct Ledger {
    storage: Arc<dyn Storage>,
    keys: Keys,
}

impl Ledger {
    pub fn new(storage: Arc<dyn Storage>, keys: Keys) -> Self {
        Self { storage, keys }
    }

    /// Loads all transactions of `user`, in the order they were registered. A user with nothing
    /// stored has an empty list.
    ///
    /// # Errors
    /// Fails if the storage cannot be read, or if the stored value is not a JSON array of
    /// well-formed transactions. Nothing is dropped silently.
    pub async fn transactions(&self, user: &User) -> Res<Vec<Transaction>> {
        let key = self.keys.transactions(user.id());
        let stored = self
            .storage
            .get(&key)
            .await
            .context("Unable to read the stored transactions")?;
        match stored {
            None => Ok(Vec::new()),
            Some(json) => serde_json::from_str(&json)
                .with_context(|| format!("The transactions stored under '{key}' are malformed")),
        }
    }

    /// Validates `new`, stamps it with a fresh id and today's date, and appends it to the list of
    /// `user`.
    ///
    /// # Errors
    /// - `ErrorType::Validation` if the name is empty, the amount is not a positive number no larger
    ///   than `MAX_AMOUNT`, or the category is unknown. Storage is not touched.
    /// - `ErrorType::Storage` if the existing list cannot be read or is malformed (it is never
    ///   overwritten in that case), or if the write fails.
    pub async fn register(&self, user: &User, new: NewTransaction) -> Result<Transaction> {
        let transaction = validate(new, TransactionDate::today()).pub_result(ErrorType::Validation)?;
        self.append(user, transaction.clone())
            .await
            .context("Unable to save the transaction")
            .pub_result(ErrorType::Storage)?;
        Ok(transaction)
    }

    async fn append(&self, user: &User, transaction: Transaction) -> Res<()> {
        let mut transactions = self.transactions(user).await?;
        transactions.push(transaction);
        let json = serde_json::to_string(&transactions)
            .context("Unable to serialize the transactions")?;
        self.storage
            .set(&self.keys.transactions(user.id()), &json)
            .await?;
        debug!(
            "Saved {} transactions for user {}",
            transactions.len(),
            user.id()
        );
        Ok(())
    }
}

/// The largest amount a single transaction may have. Far below the point where summing a user's
/// transactions could overflow a `Decimal`.
const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Turns user input into a `Transaction` dated `date`, or explains what is wrong with it.
fn validate(new: NewTransaction, date: TransactionDate) -> Res<Transaction> {
    let name = new.name.trim();
    if name.is_empty() {
        bail!("The name is required");
    }

    let amount = Amount::from_str(&new.amount).context("Enter a numeric amount")?;
    if amount.is_zero() {
        bail!("The amount must be greater than zero");
    }
    let max = Decimal::from(MAX_AMOUNT);
    if amount.value() > max {
        bail!("The amount must be at most {}", locale::brl(max));
    }

    let category = Category::find(new.category.trim())
        .with_context(|| format!("Select a category, '{}' is not one", new.category))?;

    Ok(Transaction {
        id: utils::generate_transaction_id(),
        name: name.to_string(),
        amount,
        transaction_type: new.transaction_type,
        category: category.key().to_string(),
        date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TransactionType;
    use crate::storage::MemoryStorage;

    fn user() -> User {
        User::new("any_id", "Marcelo", "marcelo@example.com", "any_photo.png")
    }

    fn new(name: &str, amount: &str, category: &str) -> NewTransaction {
        NewTransaction {
            name: name.to_string(),
            amount: amount.to_string(),
            transaction_type: TransactionType::Negative,
            category: category.to_string(),
        }
    }

    fn ledger(storage: Arc<MemoryStorage>) -> Ledger {
        Ledger::new(storage, Keys::new("@gofinances"))
    }

    #[tokio::test]
    async fn test_register_appends_one_record() {
        let storage = Arc::new(MemoryStorage::new());
        let ledger = ledger(storage.clone());
        let user = user();

        let first = ledger
            .register(&user, new("Rent", "1200", "purchases"))
            .await
            .unwrap();
        let before = ledger.transactions(&user).await.unwrap();
        assert_eq!(before, vec![first.clone()]);

        let second = ledger
            .register(&user, new(" Pizza ", "59,90", "food"))
            .await
            .unwrap();
        let after = ledger.transactions(&user).await.unwrap();

        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(after[0], first);
        assert_eq!(after[1], second);
        assert_eq!(second.name(), "Pizza");
        assert_eq!(second.amount().to_string(), "59.90");
        assert_eq!(second.transaction_type(), TransactionType::Negative);
        assert_eq!(second.category(), "food");
        assert_eq!(second.date(), TransactionDate::today());
        assert_ne!(first.id(), second.id());
    }

    #[tokio::test]
    async fn test_transactions_are_scoped_per_user() {
        let storage = Arc::new(MemoryStorage::new());
        let ledger = ledger(storage.clone());
        let other = User::new("other_id", "Ana", "ana@example.com", "");

        let _ = ledger
            .register(&user(), new("Rent", "1200", "purchases"))
            .await
            .unwrap();
        assert!(ledger.transactions(&other).await.unwrap().is_empty());
        assert!(storage
            .get("@gofinances:transactions_user:any_id")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input() {
        let storage = Arc::new(MemoryStorage::new());
        let ledger = ledger(storage.clone());
        let user = user();

        for bad in [
            new("", "10", "food"),
            new("Pizza", "ten", "food"),
            new("Pizza", "-10", "food"),
            new("Pizza", "0", "food"),
            new("Pizza", "10", "category"),
            new("Pizza", "1,000", "food"),
            new("Huge", "50000000000000000000000000000", "salary"),
            new("Huge", "1000000000000.01", "salary"),
        ] {
            let err = ledger.register(&user, bad).await.unwrap_err();
            assert_eq!(err.error_type(), ErrorType::Validation);
        }
        assert_eq!(
            storage
                .get("@gofinances:transactions_user:any_id")
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_register_largest_amount() {
        let storage = Arc::new(MemoryStorage::new());
        let ledger = ledger(storage.clone());
        let user = user();
        let saved = ledger
            .register(&user, new("Lottery", "1000000000000", "salary"))
            .await
            .unwrap();
        assert_eq!(saved.amount().brl(), "R$ 1.000.000.000.000,00");

        let err = ledger
            .register(&user, new("Lottery", "1000000000001", "salary"))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert!(err.to_string().contains("at most R$ 1.000.000.000.000,00"));
        assert_eq!(ledger.transactions(&user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_register_write_failure() {
        let storage = Arc::new(MemoryStorage::new());
        let ledger = ledger(storage.clone());
        let user = user();
        let _ = ledger
            .register(&user, new("Rent", "1200", "purchases"))
            .await
            .unwrap();

        storage.fail_writes(true);
        let err = ledger
            .register(&user, new("Pizza", "50", "food"))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Storage);
        assert!(err.to_string().contains("Unable to save the transaction"));
        assert_eq!(ledger.transactions(&user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_register_refuses_to_clobber_malformed_data() {
        let storage = Arc::new(MemoryStorage::new());
        let key = "@gofinances:transactions_user:any_id";
        storage.set(key, r#"{"not": "a list"}"#).await.unwrap();
        let ledger = ledger(storage.clone());

        let err = ledger
            .register(&user(), new("Pizza", "50", "food"))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Storage);
        assert_eq!(
            storage.get(key).await.unwrap().as_deref(),
            Some(r#"{"not": "a list"}"#)
        );
    }

    #[tokio::test]
    async fn test_transactions_malformed_record() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set(
                "@gofinances:transactions_user:any_id",
                r#"[{"id": "1", "name": "x", "amount": "abc", "type": "positive",
                    "category": "salary", "date": "10/01/23"}]"#,
            )
            .await
            .unwrap();
        let err = ledger(storage).transactions(&user()).await.unwrap_err();
        assert!(err.to_string().contains("malformed"));
    }
}
