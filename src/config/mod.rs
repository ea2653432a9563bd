//! Configuration module for Gajiku
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Tool settings persistence (device id, merge policy, retention)

pub mod paths;
pub mod settings;

pub use paths::GajikuPaths;
pub use settings::{BackupRetention, Settings, SettingsMergePolicy};
