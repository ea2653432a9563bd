//! Backup export and import
//!
//! A backup travels through these stages:
//!
//! - [`envelope`]: the `{meta, data}` file format and export
//! - [`validate`]: structural checks on untrusted input
//! - [`migrate`]: upgrade older schemas to the current one
//! - [`merge`]: record-level reconciliation
//! - [`import`]: Full Replace and Smart Merge against a storage adapter
//!
//! [`manager`] keeps timestamped backup files on disk with a retention limit.

pub mod envelope;
pub mod import;
pub mod manager;
pub mod merge;
pub mod migrate;
pub mod validate;

pub use envelope::{
    export_backup, suggested_filename, BackupEnvelope, BackupMeta, RecordCounts, APP_VERSION,
    BACKUP_FORMAT, SCHEMA_VERSION,
};
pub use import::{parse_backup, BackupImporter, ImportOptions, ImportResult, ImportStrategy, ParsedBackup};
pub use manager::{BackupInfo, BackupManager};
pub use merge::{merge_app_data, merge_collection, merge_settings, MergeCounts, MergeOutcome};
pub use migrate::{migrate_backup, migrate_backup_at, migrate_data};
pub use validate::{validate_backup, ValidatedBackup};
