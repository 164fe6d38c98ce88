//! Amount type for handling non-negative monetary values.
//!
//! A transaction's amount is always stored as a non-negative decimal string. The direction of the
//! money (income or expense) is carried by `TransactionType`, never by the sign of the amount.

use crate::model::locale;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents the amount of a single transaction.
///
/// # Examples
///
/// Parsing a plain decimal:
/// ```
/// # use gofinances::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("1000.5").unwrap();
/// assert_eq!(amount.to_string(), "1000.5");
/// assert_eq!(amount.brl(), "R$ 1.000,50");
/// ```
///
/// A decimal comma is accepted as well:
/// ```
/// # use gofinances::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("12,99").unwrap();
/// assert_eq!(amount.to_string(), "12.99");
/// ```
///
/// Negative values are rejected:
/// ```
/// # use gofinances::model::Amount;
/// # use std::str::FromStr;
/// assert!(Amount::from_str("-5").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    /// Creates a new `Amount`, failing if `value` is negative.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative(value.to_string()));
        }
        Ok(Self(value))
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Formats the amount as Brazilian reais, e.g. `R$ 1.000,00`.
    pub fn brl(&self) -> String {
        locale::brl(self.0)
    }
}

/// An error that can occur when parsing an `Amount`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum AmountError {
    Empty,
    Invalid(String),
    Negative(String),
    /// A comma followed by exactly three digits, e.g. `1,000`, which may be a thousands separator.
    Ambiguous(String),
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Empty => write!(f, "The amount is empty"),
            AmountError::Invalid(s) => write!(f, "'{s}' is not a valid amount"),
            AmountError::Negative(s) => write!(f, "The amount cannot be negative, got '{s}'"),
            AmountError::Ambiguous(s) => write!(
                f,
                "'{s}' is ambiguous, write the amount without thousands separators, e.g. 1000 or \
                1000,50"
            ),
        }
    }
}

impl std::error::Error for AmountError {}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }

        // Accept a decimal comma when there is no decimal point, e.g. "12,99".
        let normalized = if trimmed.contains(',') && !trimmed.contains('.') {
            if let Some((_, fraction)) = trimmed.split_once(',') {
                if fraction.len() == 3 && fraction.chars().all(|c| c.is_ascii_digit()) {
                    return Err(AmountError::Ambiguous(trimmed.to_string()));
                }
            }
            trimmed.replacen(',', ".", 1)
        } else {
            trimmed.to_string()
        };

        let value = Decimal::from_str(&normalized)
            .or_else(|_| Decimal::from_scientific(&normalized))
            .map_err(|_| AmountError::Invalid(trimmed.to_string()))?;
        Amount::new(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Older records may hold the amount as a JSON number instead of a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Text(String),
    Number(serde_json::Number),
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = match RawAmount::deserialize(deserializer)? {
            RawAmount::Text(s) => s,
            RawAmount::Number(n) => n.to_string(),
        };
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
