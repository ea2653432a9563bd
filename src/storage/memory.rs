//! In-memory snapshot store
//!
//! Used by tests and by embedders that persist elsewhere. Reads and writes can
//! be made to fail to exercise the engine's error paths.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;

use super::StorageAdapter;
use crate::error::{GajikuError, GajikuResult};
use crate::models::AppData;

/// Snapshot held in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<AppData>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `data`
    pub fn with_data(data: AppData) -> Self {
        Self {
            data: RwLock::new(data),
            ..Self::default()
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> GajikuResult<AppData> {
        let data = self.data.read().map_err(|e| {
            GajikuError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(data.clone())
    }

    /// Make subsequent `get_all` calls fail
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `save_all` calls fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of `get_all` calls so far
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of successful `save_all` calls so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl StorageAdapter for MemoryStore {
    async fn get_all(&self) -> GajikuResult<AppData> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(GajikuError::Storage("simulated read failure".into()));
        }
        self.snapshot()
    }

    async fn save_all(&self, data: AppData) -> GajikuResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(GajikuError::Storage("simulated write failure".into()));
        }
        let mut current = self.data.write().map_err(|e| {
            GajikuError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        *current = data;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AppSettings;

    #[tokio::test]
    async fn test_save_replaces_snapshot() {
        let store = MemoryStore::new();
        let mut data = AppData::default();
        data.settings = AppSettings {
            currency: "USD".into(),
            ..AppSettings::default()
        };

        store.save_all(data.clone()).await.unwrap();
        assert_eq!(store.get_all().await.unwrap(), data);
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.read_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_snapshot() {
        let store = MemoryStore::with_data(AppData::default());
        store.set_fail_writes(true);

        let mut data = AppData::default();
        data.settings.pin_enabled = true;
        assert!(store.save_all(data).await.is_err());

        assert!(!store.snapshot().unwrap().settings.pin_enabled);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_read() {
        let store = MemoryStore::new();
        store.set_fail_reads(true);
        assert!(matches!(
            store.get_all().await,
            Err(GajikuError::Storage(_))
        ));
    }
}
