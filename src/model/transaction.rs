use crate::model::Amount;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Whether a transaction brings money in or sends it out.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Income, shown as an "entry".
    Positive,
    /// Outgoing money, shown as an "expense".
    Negative,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

/// The date a transaction was recorded.
///
/// Stored as `DD/MM/YY`. Older records that hold a full RFC 3339 timestamp, or a four digit year,
/// are also accepted when reading.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TransactionDate(NaiveDate);

const STORED_FORMAT: &str = "%d/%m/%y";
const LONG_YEAR_FORMAT: &str = "%d/%m/%Y";

impl TransactionDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Today's date in the local timezone.
    pub fn today() -> Self {
        Self(chrono::Local::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl FromStr for TransactionDate {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, STORED_FORMAT) {
            return Ok(Self(date));
        }
        if let Ok(date) = NaiveDate::parse_from_str(s, LONG_YEAR_FORMAT) {
            return Ok(Self(date));
        }
        match DateTime::parse_from_rfc3339(s) {
            Ok(timestamp) => Ok(Self(timestamp.date_naive())),
            Err(_) => anyhow::bail!("Invalid transaction date '{s}', expected DD/MM/YY"),
        }
    }
}

impl Display for TransactionDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(STORED_FORMAT))
    }
}

impl Serialize for TransactionDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TransactionDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TransactionDate::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// A single persisted income or expense record.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Transaction {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) amount: Amount,
    #[serde(rename = "type")]
    pub(crate) transaction_type: TransactionType,
    pub(crate) category: String,
    pub(crate) date: TransactionDate,
}

impl Transaction {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn date(&self) -> TransactionDate {
        self.date
    }
}

/// The user-entered fields of a transaction that has not been saved yet.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NewTransaction {
    pub name: String,
    /// Raw text as typed by the user; validated when the transaction is registered.
    pub amount: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stored_date() {
        let date = TransactionDate::from_str("10/01/23").unwrap();
        assert_eq!(date.date(), NaiveDate::from_ymd_opt(2023, 1, 10).unwrap());
        assert_eq!(date.to_string(), "10/01/23");
    }

    #[test]
    fn test_parse_four_digit_year() {
        let date = TransactionDate::from_str("10/01/2023").unwrap();
        assert_eq!(date.date(), NaiveDate::from_ymd_opt(2023, 1, 10).unwrap());
    }

    #[test]
    fn test_parse_rfc3339() {
        let date = TransactionDate::from_str("2023-01-12T14:03:00.000Z").unwrap();
        assert_eq!(date.to_string(), "12/01/23");
    }

    #[test]
    fn test_parse_bad_date() {
        assert!(TransactionDate::from_str("32/01/23").is_err());
        assert!(TransactionDate::from_str("yesterday").is_err());
    }

    #[test]
    fn test_dates_compare_chronologically() {
        let a = TransactionDate::from_str("31/12/22").unwrap();
        let b = TransactionDate::from_str("01/01/23").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_transaction_type_strings() {
        assert_eq!(TransactionType::Positive.to_string(), "positive");
        assert_eq!(
            TransactionType::from_str("negative").unwrap(),
            TransactionType::Negative
        );
        assert!(TransactionType::from_str("neutral").is_err());
    }

    #[test]
    fn test_transaction_json_shape() {
        let json = r#"{
            "id": "a1",
            "name": "Salary",
            "amount": "1000",
            "type": "positive",
            "category": "salary",
            "date": "10/01/23"
        }"#;
        let transaction: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(transaction.transaction_type(), TransactionType::Positive);
        assert_eq!(transaction.amount().to_string(), "1000");

        let value = serde_json::to_value(&transaction).unwrap();
        assert_eq!(value["type"], "positive");
        assert_eq!(value["amount"], "1000");
        assert_eq!(value["date"], "10/01/23");
    }

    #[test]
    fn test_transaction_missing_field() {
        let json = r#"{"id": "a1", "name": "Salary", "amount": "1000", "type": "positive"}"#;
        assert!(serde_json::from_str::<Transaction>(json).is_err());
    }
}
