//! Aggregation of a user's transactions into the dashboard: the formatted list, the entries,
//! expenses and balance totals, and the date of the latest transaction in each bucket.
//!
//! Nothing here is persisted. The dashboard is recomputed from the stored list every time it is
//! loaded.

use crate::error::Res;
use crate::ledger::Ledger;
use crate::model::{locale, Category, Transaction, TransactionDate, TransactionType, User};
use anyhow::Context;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::Write;
use tracing::{debug, warn};

/// A transaction formatted for display.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct DisplayTransaction {
    pub id: String,
    pub name: String,
    /// e.g. `R$ 1.000,00`
    pub amount: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: String,
    /// The category's display name, or its key if the key is not a known category.
    pub category_name: String,
    /// e.g. `10 de janeiro de 2023`
    pub date: String,
}

impl From<&Transaction> for DisplayTransaction {
    fn from(t: &Transaction) -> Self {
        let category_name = Category::find(t.category())
            .map(|c| c.name().to_string())
            .unwrap_or_else(|| t.category().to_string());
        Self {
            id: t.id().to_string(),
            name: t.name().to_string(),
            amount: t.amount().brl(),
            transaction_type: t.transaction_type(),
            category: t.category().to_string(),
            category_name,
            date: locale::long_date(t.date().date()),
        }
    }
}

/// One of the three summary cards.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Highlight {
    /// The formatted total, e.g. `R$ 700,00`.
    pub total: String,
    /// e.g. `12 de janeiro` for entries and expenses, `01 a 12 de janeiro` for the balance. `None`
    /// when there is nothing to date.
    pub last_transaction: Option<String>,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Highlights {
    pub entries: Highlight,
    pub expenses: Highlight,
    pub balance: Highlight,
}

/// The unformatted sums behind `Highlights`.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct Totals {
    pub entries: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Dashboard {
    transactions: Vec<DisplayTransaction>,
    highlights: Highlights,
    totals: Totals,
    /// Set when the stored transactions could not be loaded and the dashboard is empty because of
    /// it.
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

impl Dashboard {
    /// Loads the transactions of `user` and aggregates them. If they cannot be loaded, or their
    /// sums overflow, the result is an empty dashboard carrying a warning; this never fails.
    pub async fn load(ledger: &Ledger, user: &User) -> Self {
        let aggregated = ledger.transactions(user).await.and_then(|transactions| {
            debug!(
                "Aggregating {} transactions for user {}",
                transactions.len(),
                user.id()
            );
            Self::aggregate(&transactions)
        });
        aggregated.unwrap_or_else(|e| {
            let message = format!("Unable to load the transactions: {e:#}");
            warn!("{message}");
            Self {
                warning: Some(message),
                ..Self::empty()
            }
        })
    }

    /// The dashboard of a user with no transactions.
    pub fn empty() -> Self {
        Self::build(&[], Totals::default(), None, None)
    }

    /// Builds the dashboard from `transactions`, keeping their order in the display list.
    ///
    /// # Errors
    /// Fails if a sum does not fit in a `Decimal`.
    pub fn aggregate(transactions: &[Transaction]) -> Res<Self> {
        let mut totals = Totals::default();
        let mut last_entry: Option<TransactionDate> = None;
        let mut last_expense: Option<TransactionDate> = None;

        for t in transactions {
            let (sum, last) = match t.transaction_type() {
                TransactionType::Positive => (&mut totals.entries, &mut last_entry),
                TransactionType::Negative => (&mut totals.expenses, &mut last_expense),
            };
            *sum = sum
                .checked_add(t.amount().value())
                .with_context(|| format!("The total overflows at transaction '{}'", t.id()))?;
            *last = (*last).max(Some(t.date()));
        }
        totals.balance = totals
            .entries
            .checked_sub(totals.expenses)
            .context("The balance overflows")?;

        Ok(Self::build(transactions, totals, last_entry, last_expense))
    }

    fn build(
        transactions: &[Transaction],
        totals: Totals,
        last_entry: Option<TransactionDate>,
        last_expense: Option<TransactionDate>,
    ) -> Self {
        let balance_label = last_entry
            .max(last_expense)
            .map(|date| format!("01 a {}", locale::day_month(date.date())));

        let highlights = Highlights {
            entries: Highlight {
                total: locale::brl(totals.entries),
                last_transaction: last_entry.map(|d| locale::day_month(d.date())),
            },
            expenses: Highlight {
                total: locale::brl(totals.expenses),
                last_transaction: last_expense.map(|d| locale::day_month(d.date())),
            },
            balance: Highlight {
                total: locale::brl(totals.balance),
                last_transaction: balance_label,
            },
        };

        Self {
            transactions: transactions.iter().map(DisplayTransaction::from).collect(),
            highlights,
            totals,
            warning: None,
        }
    }

    pub fn transactions(&self) -> &[DisplayTransaction] {
        &self.transactions
    }

    pub fn highlights(&self) -> &Highlights {
        &self.highlights
    }

    pub fn totals(&self) -> Totals {
        self.totals
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    /// Renders the cards and the transaction list as plain text for the terminal.
    pub fn render(&self, user: &User) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Olá, {}", user.name());
        let _ = writeln!(out);
        render_card(
            &mut out,
            "Entradas",
            &self.highlights.entries,
            "Última entrada no dia ",
        );
        render_card(
            &mut out,
            "Saídas",
            &self.highlights.expenses,
            "Última saída no dia ",
        );
        render_card(&mut out, "Total", &self.highlights.balance, "");

        let _ = writeln!(out, "Listagem");
        if self.transactions.is_empty() {
            let _ = writeln!(out, "  Nenhuma transação cadastrada");
        }
        for t in &self.transactions {
            let sign = match t.transaction_type {
                TransactionType::Positive => "",
                TransactionType::Negative => "- ",
            };
            let _ = writeln!(
                out,
                "  {}  {sign}{}  {}  {}",
                t.name, t.amount, t.category_name, t.date
            );
        }
        out
    }
}

fn render_card(out: &mut String, title: &str, highlight: &Highlight, caption: &str) {
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "  {}", highlight.total);
    if let Some(label) = &highlight.last_transaction {
        let _ = writeln!(out, "  {caption}{label}");
    }
    let _ = writeln!(out);
}
