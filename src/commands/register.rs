use crate::app::App;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::{NewTransaction, Transaction};
use crate::Result;

/// Handles `gofinances register`: validates `new` and appends it to the signed-in user's
/// transactions.
///
/// # Errors
/// - `ErrorType::Auth` if nobody is signed in.
/// - `ErrorType::Validation` if the name, amount or category is rejected.
/// - `ErrorType::Storage` if the transactions cannot be read or saved.
pub async fn register(app: &App, new: NewTransaction) -> Result<Out<Transaction>> {
    let user = app.user().pub_result(ErrorType::Auth)?;
    let transaction = app.ledger().register(user, new).await?;
    Ok(Out::new(
        format!(
            "Registered '{}' ({} {})",
            transaction.name(),
            transaction.transaction_type(),
            transaction.amount().brl()
        ),
        transaction,
    ))
}
