use crate::app::App;
use crate::commands::Out;
use crate::dashboard::Dashboard;
use crate::error::{ErrorType, IntoResult};
use crate::model::User;
use crate::Result;
use serde::Serialize;

/// The dashboard of one user.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    user: User,
    dashboard: Dashboard,
}

impl DashboardReport {
    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    /// The cards and the transaction list as terminal text.
    pub fn render(&self) -> String {
        self.dashboard.render(&self.user)
    }
}

/// Handles `gofinances dashboard`: aggregates the signed-in user's transactions.
///
/// Malformed stored data does not fail the command. The dashboard is then empty and the message
/// carries the warning.
///
/// # Errors
/// - `ErrorType::Auth` if nobody is signed in.
pub async fn dashboard(app: &App) -> Result<Out<DashboardReport>> {
    let user = app.user().pub_result(ErrorType::Auth)?.clone();
    let dashboard = Dashboard::load(&app.ledger(), &user).await;
    let message = match dashboard.warning() {
        Some(warning) => format!("The dashboard is empty. {warning}"),
        None => format!(
            "{} transactions, balance {}",
            dashboard.transactions().len(),
            dashboard.highlights().balance.total
        ),
    };
    Ok(Out::new(message, DashboardReport { user, dashboard }))
}
