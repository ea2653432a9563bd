//! Backup import
//!
//! Both strategies share the same front half: validate the raw text, then
//! migrate it to the current schema. Nothing touches the storage adapter
//! until that has succeeded, so a rejected file never causes a read or a
//! write.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::envelope::{BackupEnvelope, BackupMeta};
use super::merge::{merge_app_data, MergeCounts};
use super::migrate::migrate_backup;
use super::validate::validate_backup;
use crate::config::SettingsMergePolicy;
use crate::error::{GajikuError, GajikuResult};
use crate::storage::StorageAdapter;

/// How an import treats existing local data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStrategy {
    /// Discard local data and adopt the backup
    FullReplace,
    /// Reconcile the backup into local data record by record
    #[default]
    SmartMerge,
}

impl fmt::Display for ImportStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FullReplace => write!(f, "full_replace"),
            Self::SmartMerge => write!(f, "smart_merge"),
        }
    }
}

impl FromStr for ImportStrategy {
    type Err = GajikuError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "full_replace" | "replace" => Ok(Self::FullReplace),
            "smart_merge" | "merge" => Ok(Self::SmartMerge),
            other => Err(GajikuError::Config(format!("Unknown import strategy: {}", other))),
        }
    }
}

/// Outcome of an import
#[derive(Debug, Clone, Serialize)]
pub struct ImportResult {
    pub strategy: ImportStrategy,
    pub success: bool,
    pub counts: MergeCounts,
    /// Schema version the file declared before migration
    pub source_schema_version: i64,
    /// The file was migrated from an older schema
    pub migrated: bool,
    /// Whether the local settings were replaced
    pub settings_replaced: bool,
    /// Header of the imported file, after migration
    pub backup: BackupMeta,
}

/// Import behaviour that is not part of the file itself
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportOptions {
    pub settings_policy: SettingsMergePolicy,
}

/// A backup that passed validation and migration
#[derive(Debug, Clone)]
pub struct ParsedBackup {
    pub envelope: BackupEnvelope,
    pub source_schema_version: i64,
    pub migrated: bool,
}

/// Validate and migrate raw backup text without touching storage
pub fn parse_backup(raw: &str) -> GajikuResult<ParsedBackup> {
    let validated = validate_backup(raw)?;
    let source_schema_version = validated.schema_version;
    let migrated = validated.needs_migration;

    if migrated {
        info!(from = source_schema_version, "migrating backup to current schema");
    }

    let envelope = migrate_backup(validated)?;

    Ok(ParsedBackup {
        envelope,
        source_schema_version,
        migrated,
    })
}

/// Applies backups to a storage adapter
#[derive(Debug, Clone, Default)]
pub struct BackupImporter {
    options: ImportOptions,
}

impl BackupImporter {
    pub fn new(options: ImportOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Run an import with the given strategy
    pub async fn import<S: StorageAdapter>(
        &self,
        strategy: ImportStrategy,
        raw: &str,
        adapter: &S,
    ) -> GajikuResult<ImportResult> {
        match strategy {
            ImportStrategy::FullReplace => self.full_replace(raw, adapter).await,
            ImportStrategy::SmartMerge => self.smart_merge(raw, adapter).await,
        }
    }

    /// Replace all local data with the backup. Local state is never read.
    pub async fn full_replace<S: StorageAdapter>(&self, raw: &str, adapter: &S) -> GajikuResult<ImportResult> {
        let parsed = parse_backup(raw)?;
        let ParsedBackup {
            envelope,
            source_schema_version,
            migrated,
        } = parsed;
        let BackupEnvelope { meta, mut data } = envelope;

        data.settle_all();
        data.reset_budget_spent();
        data.settings.exported_at = Some(meta.exported_at);

        let counts = MergeCounts {
            added: data.record_count(),
            ..MergeCounts::default()
        };

        adapter.save_all(data).await.inspect_err(|e| {
            warn!(error = %e, "full replace failed to persist");
        })?;

        info!(added = counts.added, "full replace complete");

        Ok(ImportResult {
            strategy: ImportStrategy::FullReplace,
            success: true,
            counts,
            source_schema_version,
            migrated,
            settings_replaced: true,
            backup: meta,
        })
    }

    /// Merge the backup into local data and persist the result
    pub async fn smart_merge<S: StorageAdapter>(&self, raw: &str, adapter: &S) -> GajikuResult<ImportResult> {
        self.run_merge(raw, adapter, true).await
    }

    /// Compute a Smart Merge without persisting it
    pub async fn preview_smart_merge<S: StorageAdapter>(
        &self,
        raw: &str,
        adapter: &S,
    ) -> GajikuResult<ImportResult> {
        self.run_merge(raw, adapter, false).await
    }

    async fn run_merge<S: StorageAdapter>(&self, raw: &str, adapter: &S, persist: bool) -> GajikuResult<ImportResult> {
        let parsed = parse_backup(raw)?;
        let local = adapter.get_all().await?;

        let outcome = merge_app_data(local, &parsed.envelope, self.options.settings_policy);
        let counts = outcome.counts;

        if persist {
            adapter.save_all(outcome.data).await.inspect_err(|e| {
                warn!(error = %e, "smart merge failed to persist");
            })?;
        }

        info!(
            persisted = persist,
            added = counts.added,
            updated = counts.updated,
            skipped = counts.skipped,
            deleted = counts.deleted,
            conflicts = counts.conflicts,
            "smart merge complete"
        );

        Ok(ImportResult {
            strategy: ImportStrategy::SmartMerge,
            success: true,
            counts,
            source_schema_version: parsed.source_schema_version,
            migrated: parsed.migrated,
            settings_replaced: outcome.settings_replaced,
            backup: parsed.envelope.meta,
        })
    }
}
