//! Backup file management
//!
//! Keeps exported envelopes in the backups directory under timestamped names
//! and prunes them to the configured retention count.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Deserialize;
use tracing::debug;

use super::envelope::{BackupEnvelope, BackupMeta, BACKUP_FORMAT};
use crate::config::paths::GajikuPaths;
use crate::config::settings::BackupRetention;
use crate::error::{GajikuError, GajikuResult};
use crate::storage::write_atomic;

/// Metadata about a stored backup
#[derive(Debug, Clone)]
pub struct BackupInfo {
    /// Backup filename
    pub filename: String,
    /// Full path to backup
    pub path: PathBuf,
    /// When the backup file was written
    pub created_at: DateTime<Utc>,
    /// Size in bytes
    pub size_bytes: u64,
    /// Envelope header, if the file could be read
    pub meta: Option<BackupMeta>,
}

/// Only the header is needed for listings
#[derive(Deserialize)]
struct HeaderOnly {
    meta: BackupMeta,
}

/// Manages backup creation and retention
pub struct BackupManager {
    backup_dir: PathBuf,
    retention: BackupRetention,
}

impl BackupManager {
    pub fn new(paths: &GajikuPaths, retention: BackupRetention) -> Self {
        Self {
            backup_dir: paths.backup_dir(),
            retention,
        }
    }

    /// Write an envelope into the backup directory
    ///
    /// Returns the path to the created backup file.
    pub fn create_backup(&self, envelope: &BackupEnvelope, pretty: bool) -> GajikuResult<PathBuf> {
        fs::create_dir_all(&self.backup_dir).map_err(|e| {
            GajikuError::Io(format!("Failed to create backup directory: {}", e))
        })?;

        let now = Utc::now();
        let filename = format!(
            "{}-{}-{:03}.json",
            BACKUP_FORMAT,
            now.format("%Y%m%d-%H%M%S"),
            now.timestamp_subsec_millis()
        );
        let backup_path = self.backup_dir.join(&filename);

        write_atomic(&backup_path, |writer| envelope.write_to(writer, pretty))?;

        debug!(path = %backup_path.display(), "wrote backup");
        Ok(backup_path)
    }

    /// List all available backups, newest first
    pub fn list_backups(&self) -> GajikuResult<Vec<BackupInfo>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();

        for entry in fs::read_dir(&self.backup_dir).map_err(|e| {
            GajikuError::Io(format!("Failed to read backup directory: {}", e))
        })? {
            let entry = entry.map_err(|e| {
                GajikuError::Io(format!("Failed to read directory entry: {}", e))
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                match parse_backup_info(&path) {
                    Some(info) => backups.push(info),
                    None => debug!(path = %path.display(), "not a backup file name, skipping"),
                }
            }
        }

        backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(backups)
    }

    /// Delete backups beyond the retention count, oldest first
    pub fn enforce_retention(&self) -> GajikuResult<Vec<PathBuf>> {
        let backups = self.list_backups()?;
        let mut deleted = Vec::new();

        for backup in backups.into_iter().skip(self.retention.keep_count as usize) {
            fs::remove_file(&backup.path).map_err(|e| {
                GajikuError::Io(format!("Failed to delete old backup: {}", e))
            })?;
            deleted.push(backup.path);
        }

        Ok(deleted)
    }

    /// Create a backup and then enforce retention
    pub fn create_backup_with_retention(
        &self,
        envelope: &BackupEnvelope,
        pretty: bool,
    ) -> GajikuResult<(PathBuf, Vec<PathBuf>)> {
        let backup_path = self.create_backup(envelope, pretty)?;
        let deleted = self.enforce_retention()?;
        Ok((backup_path, deleted))
    }

    pub fn backup_dir(&self) -> &PathBuf {
        &self.backup_dir
    }

    /// Get the most recent backup
    pub fn get_latest_backup(&self) -> GajikuResult<Option<BackupInfo>> {
        let backups = self.list_backups()?;
        Ok(backups.into_iter().next())
    }

    /// Resolve `latest`, a backup filename, or a path to a file
    pub fn resolve(&self, identifier: &str) -> GajikuResult<PathBuf> {
        if identifier == "latest" {
            return self
                .get_latest_backup()?
                .map(|b| b.path)
                .ok_or_else(|| GajikuError::backup_not_found("latest"));
        }

        let in_dir = self.backup_dir.join(identifier);
        if in_dir.is_file() {
            return Ok(in_dir);
        }

        let as_path = PathBuf::from(identifier);
        if as_path.is_file() {
            return Ok(as_path);
        }

        Err(GajikuError::backup_not_found(identifier))
    }
}

fn parse_backup_info(path: &Path) -> Option<BackupInfo> {
    let filename = path.file_name()?.to_string_lossy().to_string();

    let date_part = filename
        .strip_prefix(BACKUP_FORMAT)?
        .strip_prefix('-')?
        .strip_suffix(".json")?;
    let created_at = parse_backup_timestamp(date_part)?;

    let size_bytes = fs::metadata(path).ok()?.len();

    let meta = fs::read_to_string(path)
        .ok()
        .and_then(|contents| serde_json::from_str::<HeaderOnly>(&contents).ok())
        .map(|header| header.meta);

    Some(BackupInfo {
        filename,
        path: path.to_path_buf(),
        created_at,
        size_bytes,
        meta,
    })
}

/// Parse the timestamp part of a backup filename.
///
/// Accepts `YYYYMMDD-HHMMSS[-mmm]` as written by [`BackupManager::create_backup`]
/// and the date-only `YYYY-MM-DD` of a shared export, read as midnight UTC.
fn parse_backup_timestamp(date_str: &str) -> Option<DateTime<Utc>> {
    if date_str.len() == 10 {
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()?;
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
    }

    let parts: Vec<&str> = date_str.split('-').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return None;
    }

    let (date_part, time_part) = (parts[0], parts[1]);
    if date_part.len() != 8 || time_part.len() != 6 {
        return None;
    }
    if !date_part.bytes().chain(time_part.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let millis: u32 = match parts.get(2) {
        Some(ms) => ms.parse().ok()?,
        None => 0,
    };

    let date = NaiveDate::from_ymd_opt(
        date_part[0..4].parse().ok()?,
        date_part[4..6].parse().ok()?,
        date_part[6..8].parse().ok()?,
    )?;
    let time = NaiveTime::from_hms_milli_opt(
        time_part[0..2].parse().ok()?,
        time_part[2..4].parse().ok()?,
        time_part[4..6].parse().ok()?,
        millis,
    )?;

    Some(NaiveDateTime::new(date, time).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::suggested_filename;
    use crate::models::{AppData, Transaction, TransactionType};
    use chrono::{Datelike, Timelike};
    use tempfile::TempDir;

    fn create_test_manager(keep_count: u32) -> (BackupManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = GajikuPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();

        let manager = BackupManager::new(&paths, BackupRetention { keep_count });
        (manager, temp_dir)
    }

    fn envelope() -> BackupEnvelope {
        let mut data = AppData::default();
        data.transactions
            .push(Transaction::new("t-1", TransactionType::Income, 1.0, "salary", 1, 1));
        BackupEnvelope::with_exported_at(data, "device", 42)
    }

    #[test]
    fn test_create_backup() {
        let (manager, _temp) = create_test_manager(5);

        let backup_path = manager.create_backup(&envelope(), true).unwrap();
        assert!(backup_path.exists());
        assert!(backup_path.to_string_lossy().contains("gajiku-backup-"));
    }

    #[test]
    fn test_list_backups_reads_meta() {
        let (manager, _temp) = create_test_manager(5);

        manager.create_backup(&envelope(), false).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(20));
        manager.create_backup(&envelope(), false).unwrap();

        let backups = manager.list_backups().unwrap();
        assert_eq!(backups.len(), 2);
        assert!(backups[0].created_at >= backups[1].created_at);

        let meta = backups[0].meta.as_ref().unwrap();
        assert_eq!(meta.exported_at, 42);
        assert_eq!(meta.record_counts.transactions, 1);
    }

    #[test]
    fn test_unrelated_files_ignored() {
        let (manager, _temp) = create_test_manager(5);
        fs::write(manager.backup_dir().join("notes.json"), "{}").unwrap();

        assert!(manager.list_backups().unwrap().is_empty());
    }

    #[test]
    fn test_retention_policy() {
        let (manager, _temp) = create_test_manager(3);

        for _ in 0..5 {
            manager.create_backup(&envelope(), false).unwrap();
            std::thread::sleep(std::time::Duration::from_millis(20));
        }

        let deleted = manager.enforce_retention().unwrap();
        assert_eq!(deleted.len(), 2);
        assert_eq!(manager.list_backups().unwrap().len(), 3);
    }

    #[test]
    fn test_get_latest_and_resolve() {
        let (manager, _temp) = create_test_manager(5);

        assert!(manager.get_latest_backup().unwrap().is_none());
        assert!(manager.resolve("latest").unwrap_err().is_not_found());

        let path = manager.create_backup(&envelope(), true).unwrap();
        assert_eq!(manager.get_latest_backup().unwrap().unwrap().path, path);
        assert_eq!(manager.resolve("latest").unwrap(), path);

        let filename = path.file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(manager.resolve(&filename).unwrap(), path);
        assert!(manager.resolve("missing.json").is_err());
    }

    #[test]
    fn test_parse_backup_timestamp() {
        let timestamp = parse_backup_timestamp("20251127-143022").unwrap();
        assert_eq!(timestamp.year(), 2025);
        assert_eq!(timestamp.month(), 11);
        assert_eq!(timestamp.day(), 27);

        let timestamp = parse_backup_timestamp("20251127-143022-456").unwrap();
        assert_eq!(timestamp.timestamp_subsec_millis(), 456);
        assert_eq!(timestamp.hour(), 14);

        let timestamp = parse_backup_timestamp("2025-11-27").unwrap();
        assert_eq!((timestamp.day(), timestamp.hour()), (27, 0));

        assert!(parse_backup_timestamp("2025-13-27").is_none());
        assert!(parse_backup_timestamp("20251327-143022").is_none());
    }

    #[test]
    fn test_shared_export_name_is_listed() {
        let (manager, _temp) = create_test_manager(5);
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let shared = manager.backup_dir().join(suggested_filename(date));
        fs::write(&shared, serde_json::to_string_pretty(&envelope()).unwrap()).unwrap();

        let created = manager.create_backup(&envelope(), false).unwrap();

        let backups = manager.list_backups().unwrap();
        assert_eq!(backups.len(), 2);
        assert_eq!(backups[0].path, created);
        assert_eq!(backups[1].path, shared);
        assert_eq!(backups[1].created_at.month(), 3);
    }

    #[test]
    fn test_create_backup_leaves_no_staging_file() {
        let (manager, _temp) = create_test_manager(5);
        manager.create_backup(&envelope(), true).unwrap();

        let names: Vec<String> = fs::read_dir(manager.backup_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].ends_with(".json"));
    }
}
