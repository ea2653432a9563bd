//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the backup engine.

pub mod backup;
pub mod export;
pub mod history;
pub mod import;

pub use backup::{handle_backup_command, BackupCommands};
pub use export::{handle_export_command, ExportArgs};
pub use history::handle_history_command;
pub use import::{handle_import_command, handle_validate_command, ImportArgs, StrategyArg};
