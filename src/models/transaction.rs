//! Transaction model
//!
//! An income or expense entry with an occurrence date.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::record::{impl_record, RecordMeta, Timestamp};

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    #[default]
    Expense,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "Income"),
            Self::Expense => write!(f, "Expense"),
        }
    }
}

/// A financial transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(flatten)]
    pub meta: RecordMeta,

    /// Income or expense
    #[serde(rename = "type", default)]
    pub kind: TransactionType,

    /// Amount, always positive; direction comes from `kind`
    #[serde(default)]
    pub amount: f64,

    /// Category key (e.g. "food", "salary")
    #[serde(default)]
    pub category: String,

    /// Free-form note
    #[serde(default)]
    pub note: String,

    /// When the transaction occurred
    pub date: Timestamp,
}

impl_record!(Transaction);

impl Transaction {
    /// Create a new transaction occurring at `date`
    pub fn new(
        id: impl Into<String>,
        kind: TransactionType,
        amount: f64,
        category: impl Into<String>,
        date: Timestamp,
        now: Timestamp,
    ) -> Self {
        Self {
            meta: RecordMeta::new(id, now),
            kind,
            amount,
            category: category.into(),
            note: String::new(),
            date,
        }
    }

    /// Signed amount: positive for income, negative for expense
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;

    #[test]
    fn test_serializes_flat_camel_case() {
        let txn = Transaction::new("t-1", TransactionType::Income, 5000.0, "salary", 10, 20);
        let value = serde_json::to_value(&txn).unwrap();

        assert_eq!(value["id"], "t-1");
        assert_eq!(value["type"], "income");
        assert_eq!(value["createdAt"], 20);
        assert_eq!(value["deletedAt"], serde_json::Value::Null);
        assert_eq!(value["isDirty"], true);
        assert_eq!(value["date"], 10);
    }

    #[test]
    fn test_deserialize_with_missing_optional_fields() {
        let txn: Transaction = serde_json::from_str(
            r#"{"id":"t-2","createdAt":1,"updatedAt":2,"date":3,"amount":12.5}"#,
        )
        .unwrap();

        assert_eq!(txn.id(), "t-2");
        assert_eq!(txn.kind, TransactionType::Expense);
        assert!(txn.note.is_empty());
        assert!(txn.is_active());
    }

    #[test]
    fn test_signed_amount() {
        let income = Transaction::new("a", TransactionType::Income, 100.0, "gift", 0, 0);
        let expense = Transaction::new("b", TransactionType::Expense, 40.0, "food", 0, 0);
        assert_eq!(income.signed_amount(), 100.0);
        assert_eq!(expense.signed_amount(), -40.0);
    }
}
