//! Budget model
//!
//! A spending limit for one category over a recurring period. `spent` is a
//! cache derived from live transactions; it is never authoritative.

use serde::{Deserialize, Serialize};

use super::record::{Record, RecordMeta, Timestamp};

/// Recurrence of a budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

/// A category budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    #[serde(flatten)]
    pub meta: RecordMeta,

    /// Category key this budget limits
    #[serde(default)]
    pub category: String,

    /// Display label
    #[serde(default)]
    pub label: String,

    /// Spending limit for one period
    #[serde(default)]
    pub limit: f64,

    /// Amount spent in the current period (derived)
    #[serde(default)]
    pub spent: f64,

    #[serde(default)]
    pub period: BudgetPeriod,

    /// Color token name (e.g. "budget-food")
    #[serde(default)]
    pub color: String,
}

impl Record for Budget {
    fn meta(&self) -> &RecordMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut RecordMeta {
        &mut self.meta
    }

    fn clear_derived(&mut self) {
        self.spent = 0.0;
    }
}

impl Budget {
    /// Create a new monthly budget
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        limit: f64,
        now: Timestamp,
    ) -> Self {
        let category = category.into();
        Self {
            meta: RecordMeta::new(id, now),
            label: category.clone(),
            color: format!("budget-{}", category),
            category,
            limit,
            spent: 0.0,
            period: BudgetPeriod::Monthly,
        }
    }
}
