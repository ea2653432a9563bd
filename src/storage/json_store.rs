//! JSON file snapshot store
//!
//! Keeps the entire [`AppData`] snapshot in one file so `save_all` is a single
//! atomic rename.

use std::path::PathBuf;

use tracing::debug;

use super::file_io::{read_json, write_json_atomic};
use super::StorageAdapter;
use crate::config::paths::GajikuPaths;
use crate::error::GajikuResult;
use crate::models::AppData;

/// Snapshot store backed by `data/app_data.json`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store for the standard snapshot location
    pub fn new(paths: &GajikuPaths) -> Self {
        Self::at(paths.app_data_file())
    }

    /// Create a store for an explicit file
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read synchronously; a missing file is an empty snapshot
    pub fn load(&self) -> GajikuResult<AppData> {
        read_json(&self.path)
    }

    /// Write synchronously and atomically
    pub fn store(&self, data: &AppData) -> GajikuResult<()> {
        debug!(
            path = %self.path.display(),
            records = data.record_count(),
            "writing snapshot"
        );
        write_json_atomic(&self.path, data)
    }
}

impl StorageAdapter for JsonFileStore {
    async fn get_all(&self) -> GajikuResult<AppData> {
        self.load()
    }

    async fn save_all(&self, data: AppData) -> GajikuResult<()> {
        self.store(&data)
    }
}
