//! Backup envelope format
//!
//! A backup file is a `{meta, data}` JSON object. `meta` identifies the file
//! as a Gajiku backup and records the schema version it was written under;
//! `data` is the complete [`AppData`] snapshot.

use std::io::Write;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{GajikuError, GajikuResult};
use crate::models::{now_ms, AppData, Record, Timestamp};
use crate::storage::StorageAdapter;

/// Fixed format tag every backup must carry in `meta.format`
pub const BACKUP_FORMAT: &str = "gajiku-backup";

/// Schema version written by this build
pub const SCHEMA_VERSION: u32 = 1;

/// Application version stamped into exports
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Record counts at export time. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordCounts {
    pub transactions: usize,
    pub budgets: usize,
    pub savings_goals: usize,
    pub notifications: usize,
}

impl RecordCounts {
    /// Count the records of a snapshot. Notifications count active ones only.
    pub fn of(data: &AppData) -> Self {
        Self {
            transactions: data.transactions.len(),
            budgets: data.budgets.len(),
            savings_goals: data.savings_goals.len(),
            notifications: data.notifications.iter().filter(|n| n.is_active()).count(),
        }
    }

    pub fn total(&self) -> usize {
        self.transactions + self.budgets + self.savings_goals + self.notifications
    }
}

/// Envelope header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupMeta {
    /// Always [`BACKUP_FORMAT`]
    pub format: String,

    /// Schema version the data section conforms to
    pub schema_version: u32,

    /// Export time
    #[serde(default)]
    pub exported_at: Timestamp,

    /// Version of the app that wrote the file
    #[serde(default)]
    pub app_version: String,

    /// Opaque identifier of the exporting device
    #[serde(default)]
    pub device_id: String,

    #[serde(default)]
    pub record_counts: RecordCounts,
}

impl BackupMeta {
    /// Export time as a UTC datetime, if representable
    pub fn exported_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.exported_at)
    }
}

/// A complete backup file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupEnvelope {
    pub meta: BackupMeta,
    pub data: AppData,
}

impl BackupEnvelope {
    /// Wrap a snapshot for export, stamped with the current time
    pub fn from_app_data(data: AppData, device_id: impl Into<String>) -> Self {
        Self::with_exported_at(data, device_id, now_ms())
    }

    /// Wrap a snapshot for export with an explicit export time
    pub fn with_exported_at(
        data: AppData,
        device_id: impl Into<String>,
        exported_at: Timestamp,
    ) -> Self {
        let meta = BackupMeta {
            format: BACKUP_FORMAT.to_string(),
            schema_version: SCHEMA_VERSION,
            exported_at,
            app_version: APP_VERSION.to_string(),
            device_id: device_id.into(),
            record_counts: RecordCounts::of(&data),
        };
        Self { meta, data }
    }

    /// Serialize into a writer
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> GajikuResult<()> {
        if pretty {
            serde_json::to_writer_pretty(&mut *writer, self)
        } else {
            serde_json::to_writer(&mut *writer, self)
        }
        .map_err(|e| GajikuError::Export(e.to_string()))?;

        writer
            .flush()
            .map_err(|e| GajikuError::Export(format!("Failed to flush export: {}", e)))
    }
}

/// File name offered to the user for an export made on `date`
pub fn suggested_filename(date: NaiveDate) -> String {
    format!("{}-{}.json", BACKUP_FORMAT, date.format("%Y-%m-%d"))
}

/// Read the local snapshot and write it as a backup envelope
pub async fn export_backup<S, W>(
    adapter: &S,
    device_id: &str,
    writer: &mut W,
    pretty: bool,
) -> GajikuResult<BackupMeta>
where
    S: StorageAdapter,
    W: Write,
{
    let data = adapter.get_all().await?;
    let envelope = BackupEnvelope::from_app_data(data, device_id);
    envelope.write_to(writer, pretty)?;

    info!(
        records = envelope.meta.record_counts.total(),
        exported_at = envelope.meta.exported_at,
        "exported backup"
    );

    Ok(envelope.meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Notification, Severity, Transaction, TransactionType};
    use crate::storage::MemoryStore;

    fn sample_data() -> AppData {
        let mut data = AppData::default();
        data.transactions.push(Transaction::new(
            "t-1",
            TransactionType::Expense,
            25_000.0,
            "food",
            1_700_000_000_000,
            1_700_000_000_000,
        ));
        let mut gone = Notification::new("n-1", "Old", "gone", Severity::Info, 10);
        gone.meta.deleted_at = Some(20);
        data.notifications.push(gone);
        data.notifications
            .push(Notification::new("n-2", "New", "here", Severity::Success, 30));
        data
    }

    #[test]
    fn test_meta_from_app_data() {
        let envelope = BackupEnvelope::with_exported_at(sample_data(), "device-a", 1234);

        assert_eq!(envelope.meta.format, BACKUP_FORMAT);
        assert_eq!(envelope.meta.schema_version, SCHEMA_VERSION);
        assert_eq!(envelope.meta.exported_at, 1234);
        assert_eq!(envelope.meta.device_id, "device-a");
        assert_eq!(envelope.meta.record_counts.transactions, 1);
        // tombstoned notifications are not counted
        assert_eq!(envelope.meta.record_counts.notifications, 1);
    }

    #[test]
    fn test_wire_shape() {
        let envelope = BackupEnvelope::with_exported_at(sample_data(), "device-a", 1234);
        let value = serde_json::to_value(&envelope).unwrap();

        assert_eq!(value["meta"]["format"], "gajiku-backup");
        assert_eq!(value["meta"]["schemaVersion"], 1);
        assert_eq!(value["meta"]["recordCounts"]["savingsGoals"], 0);
        assert!(value["data"]["transactions"].is_array());
        assert_eq!(value["data"]["transactions"][0]["isDirty"], true);
        assert!(value["data"]["settings"].is_object());
    }

    #[test]
    fn test_suggested_filename() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(suggested_filename(date), "gajiku-backup-2025-03-09.json");
    }

    #[tokio::test]
    async fn test_export_backup_reads_adapter() {
        let store = MemoryStore::with_data(sample_data());
        let mut out = Vec::new();

        let meta = export_backup(&store, "device-b", &mut out, true).await.unwrap();
        assert_eq!(meta.device_id, "device-b");

        let parsed: BackupEnvelope = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.data, sample_data());
        assert_eq!(store.write_count(), 0);
    }
}
