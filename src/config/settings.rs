//! Tool configuration for Gajiku
//!
//! Persists the device identity stamped into exports, the settings merge
//! policy, and backup retention.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::paths::GajikuPaths;
use crate::error::GajikuError;
use crate::storage::file_io::write_json_atomic;

/// How a Smart Merge decides between local and incoming app settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SettingsMergePolicy {
    /// Adopt incoming settings when the backup was exported after the
    /// backup the local settings came from
    #[default]
    NewerExport,
    /// Always adopt incoming settings
    PreferIncoming,
    /// Never replace local settings
    KeepLocal,
}

impl fmt::Display for SettingsMergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NewerExport => write!(f, "newer-export"),
            Self::PreferIncoming => write!(f, "prefer-incoming"),
            Self::KeepLocal => write!(f, "keep-local"),
        }
    }
}

impl FromStr for SettingsMergePolicy {
    type Err = GajikuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "newer-export" => Ok(Self::NewerExport),
            "prefer-incoming" => Ok(Self::PreferIncoming),
            "keep-local" => Ok(Self::KeepLocal),
            other => Err(GajikuError::Config(format!(
                "Unknown settings merge policy '{}'",
                other
            ))),
        }
    }
}

/// Backup retention settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupRetention {
    /// Number of backup files to keep in the backups directory
    pub keep_count: u32,
}

impl Default for BackupRetention {
    fn default() -> Self {
        Self { keep_count: 20 }
    }
}

/// Tool configuration for Gajiku
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Random per-device identifier stamped into exported backups
    #[serde(default = "generate_device_id")]
    pub device_id: String,

    /// Settings merge policy used by Smart Merge
    #[serde(default)]
    pub settings_merge: SettingsMergePolicy,

    /// Write exported backups with indentation
    #[serde(default = "default_pretty_export")]
    pub pretty_export: bool,

    /// Backup retention policy
    #[serde(default)]
    pub backup_retention: BackupRetention,
}

fn default_schema_version() -> u32 {
    1
}

fn default_pretty_export() -> bool {
    true
}

/// 16 random bytes as 32 lowercase hex characters
pub fn generate_device_id() -> String {
    Uuid::new_v4().simple().to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            device_id: generate_device_id(),
            settings_merge: SettingsMergePolicy::default(),
            pretty_export: default_pretty_export(),
            backup_retention: BackupRetention::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &GajikuPaths) -> Result<Self, GajikuError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                GajikuError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                GajikuError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &GajikuPaths) -> Result<(), GajikuError> {
        paths.ensure_directories()?;
        write_json_atomic(paths.settings_file(), self)
    }
}
