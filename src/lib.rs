//! Gajiku - backup and restore for the Gajiku personal finance tracker
//!
//! This library moves a user's complete financial snapshot (transactions,
//! budgets, savings goals, notifications and settings) between devices as a
//! versioned JSON backup file, and reconciles an incoming backup with the
//! data already on the device.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: The snapshot and its record types
//! - `storage`: Snapshot storage adapters and on-device migration
//! - `backup`: Export, validation, migration, merge and backup files
//! - `audit`: Import history log
//! - `cli`: Command handlers for the `gajiku` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use gajiku::backup::{BackupImporter, ImportStrategy};
//! use gajiku::storage::JsonFileStore;
//!
//! let store = JsonFileStore::new(&paths);
//! let result = BackupImporter::default()
//!     .import(ImportStrategy::SmartMerge, &raw, &store)
//!     .await?;
//! println!("{} added, {} conflicts", result.counts.added, result.counts.conflicts);
//! ```

pub mod audit;
pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;

pub use error::{GajikuError, GajikuResult};
