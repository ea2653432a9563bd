//! Storage initialization
//!
//! Handles first-run setup and upgrading the on-device snapshot to the
//! current schema.

use serde_json::Value;
use tracing::info;

use crate::backup::migrate::migrate_data;
use crate::backup::SCHEMA_VERSION;
use crate::config::paths::GajikuPaths;
use crate::error::{GajikuError, GajikuResult};
use crate::models::{now_ms, AppData};

use super::file_io::{read_json, write_json_atomic};

/// What `initialize_storage` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    /// A fresh empty snapshot was written
    pub created_defaults: bool,
    /// Schema version the stored snapshot was upgraded from, if it was
    pub migrated_from: Option<u32>,
    /// Schema version of the snapshot after initialization
    pub schema_version: u32,
}

/// Initialize storage for use
///
/// Creates directories, writes an empty snapshot on first run, and migrates an
/// existing snapshot written under an older schema.
pub fn initialize_storage(paths: &GajikuPaths) -> GajikuResult<InitReport> {
    paths.ensure_directories()?;

    let data_file = paths.app_data_file();
    let version_file = paths.schema_version_file();

    if !data_file.exists() {
        write_json_atomic(&data_file, &AppData::default())?;
        write_json_atomic(&version_file, &SCHEMA_VERSION)?;
        return Ok(InitReport {
            created_defaults: true,
            migrated_from: None,
            schema_version: SCHEMA_VERSION,
        });
    }

    let stored_version: u32 = read_json(&version_file)?;
    if stored_version >= SCHEMA_VERSION {
        return Ok(InitReport {
            created_defaults: false,
            migrated_from: None,
            schema_version: stored_version,
        });
    }

    let mut document: Value = read_json(&data_file)?;
    if document.is_null() {
        document = Value::Object(Default::default());
    }
    migrate_data(&mut document, i64::from(stored_version), now_ms())?;

    let data: AppData = serde_json::from_value(document).map_err(|e| {
        GajikuError::Migration(format!("Stored snapshot does not match schema v{}: {}", SCHEMA_VERSION, e))
    })?;

    write_json_atomic(&data_file, &data)?;
    write_json_atomic(&version_file, &SCHEMA_VERSION)?;

    info!(from = stored_version, to = SCHEMA_VERSION, "migrated local snapshot");

    Ok(InitReport {
        created_defaults: false,
        migrated_from: Some(stored_version),
        schema_version: SCHEMA_VERSION,
    })
}
