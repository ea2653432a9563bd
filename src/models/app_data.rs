//! The complete local snapshot
//!
//! `AppData` is what a storage adapter reads and writes in one piece, and what
//! the `data` section of a backup envelope contains.

use serde::{Deserialize, Serialize};

use super::budget::Budget;
use super::notification::Notification;
use super::record::Record;
use super::savings::SavingsGoal;
use super::settings::AppSettings;
use super::transaction::Transaction;

/// All collections plus settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    #[serde(default)]
    pub transactions: Vec<Transaction>,

    #[serde(default)]
    pub budgets: Vec<Budget>,

    #[serde(default)]
    pub savings_goals: Vec<SavingsGoal>,

    #[serde(default)]
    pub notifications: Vec<Notification>,

    #[serde(default)]
    pub settings: AppSettings,
}

impl AppData {
    /// Total number of records across all four collections, tombstones included
    pub fn record_count(&self) -> usize {
        self.transactions.len()
            + self.budgets.len()
            + self.savings_goals.len()
            + self.notifications.len()
    }

    /// Settle every record: clear dirty flags and derived fields
    pub fn settle_all(&mut self) {
        settle(&mut self.transactions);
        settle(&mut self.budgets);
        settle(&mut self.savings_goals);
        settle(&mut self.notifications);
    }

    /// Force every budget's derived `spent` back to zero
    pub fn reset_budget_spent(&mut self) {
        for budget in &mut self.budgets {
            budget.spent = 0.0;
        }
    }

    /// Whether any record has changes not yet exported
    pub fn has_dirty_records(&self) -> bool {
        self.transactions.iter().any(|r| r.meta.is_dirty)
            || self.budgets.iter().any(|r| r.meta.is_dirty)
            || self.savings_goals.iter().any(|r| r.meta.is_dirty)
            || self.notifications.iter().any(|r| r.meta.is_dirty)
    }
}

fn settle<R: Record>(records: &mut [R]) {
    for record in records {
        record.settle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Budget, Transaction, TransactionType};

    #[test]
    fn test_empty_snapshot_from_empty_object() {
        let data: AppData = serde_json::from_str("{}").unwrap();
        assert_eq!(data.record_count(), 0);
        assert_eq!(data.settings, AppSettings::default());
    }

    #[test]
    fn test_settle_all() {
        let mut data = AppData::default();
        data.transactions
            .push(Transaction::new("t", TransactionType::Expense, 1.0, "food", 1, 1));
        let mut budget = Budget::new("b", "food", 10.0, 1);
        budget.spent = 4.0;
        data.budgets.push(budget);

        assert!(data.has_dirty_records());
        data.settle_all();
        assert!(!data.has_dirty_records());
        assert_eq!(data.budgets[0].spent, 0.0);
        assert_eq!(data.record_count(), 2);
    }

    #[test]
    fn test_collection_keys_are_camel_case() {
        let json = serde_json::to_value(AppData::default()).unwrap();
        assert!(json.get("savingsGoals").is_some());
        assert!(json.get("settings").is_some());
    }
}
