//! Types that represent the core data model, such as `Transaction` and `User`.
mod amount;
mod category;
pub(crate) mod locale;
mod transaction;
mod user;

pub use amount::{Amount, AmountError};
pub use category::Category;
pub use transaction::{NewTransaction, Transaction, TransactionDate, TransactionType};
pub use user::User;
