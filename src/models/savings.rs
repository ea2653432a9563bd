//! Savings goal model

use serde::{Deserialize, Serialize};

use super::record::{impl_record, Record, RecordMeta, Timestamp};

/// A savings target with a deadline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsGoal {
    #[serde(flatten)]
    pub meta: RecordMeta,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub target_amount: f64,

    #[serde(default)]
    pub current_amount: f64,

    /// Target date
    pub deadline: Timestamp,

    /// Emoji or icon name
    #[serde(default)]
    pub icon: String,

    #[serde(default)]
    pub is_completed: bool,
}

impl_record!(SavingsGoal);

impl SavingsGoal {
    /// Create an empty goal
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        target_amount: f64,
        deadline: Timestamp,
        now: Timestamp,
    ) -> Self {
        Self {
            meta: RecordMeta::new(id, now),
            name: name.into(),
            target_amount,
            current_amount: 0.0,
            deadline,
            icon: String::new(),
            is_completed: false,
        }
    }

    /// Add money to the goal, completing it once the target is reached
    pub fn deposit(&mut self, amount: f64, now: Timestamp) {
        self.current_amount += amount;
        self.is_completed = self.current_amount >= self.target_amount;
        self.touch(now);
    }

    /// Progress towards the target in the range `0.0..=1.0`
    pub fn progress(&self) -> f64 {
        if self.target_amount <= 0.0 {
            return 1.0;
        }
        (self.current_amount / self.target_amount).clamp(0.0, 1.0)
    }
}
