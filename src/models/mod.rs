//! Core data models for Gajiku
//!
//! This module contains the record shapes stored on device and carried in
//! backups: transactions, budgets, savings goals, notifications, and the
//! application settings.

pub mod app_data;
pub mod budget;
pub mod notification;
pub mod record;
pub mod savings;
pub mod settings;
pub mod transaction;

pub use app_data::AppData;
pub use budget::{Budget, BudgetPeriod};
pub use notification::{Notification, Severity};
pub use record::{now_ms, Record, RecordMeta, Timestamp};
pub use savings::SavingsGoal;
pub use settings::{AppSettings, Language, Theme};
pub use transaction::{Transaction, TransactionType};
