//! Import history entries
//!
//! One entry per import attempt, successful or not.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::backup::{ImportResult, ImportStrategy, MergeCounts};
use crate::error::{GajikuError, ValidationErrorKind};

/// How an import attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportOutcome {
    Applied,
    Previewed,
    Failed,
}

impl std::fmt::Display for ImportOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportOutcome::Applied => write!(f, "APPLIED"),
            ImportOutcome::Previewed => write!(f, "PREVIEW"),
            ImportOutcome::Failed => write!(f, "FAILED"),
        }
    }
}

/// A single import history entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportAuditEntry {
    /// When the import ran (UTC)
    pub timestamp: DateTime<Utc>,

    pub strategy: ImportStrategy,

    pub outcome: ImportOutcome,

    /// File the backup was read from
    pub source: String,

    /// Device that exported the backup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,

    /// Schema version the file declared before migration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<MergeCounts>,

    /// Validation kind, when the file was rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ValidationErrorKind>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImportAuditEntry {
    /// Entry for an import that completed
    pub fn completed(source: impl Into<String>, result: &ImportResult, dry_run: bool) -> Self {
        Self {
            timestamp: Utc::now(),
            strategy: result.strategy,
            outcome: if dry_run {
                ImportOutcome::Previewed
            } else {
                ImportOutcome::Applied
            },
            source: source.into(),
            device_id: Some(result.backup.device_id.clone()).filter(|id| !id.is_empty()),
            schema_version: Some(result.source_schema_version),
            counts: Some(result.counts),
            error_kind: None,
            error: None,
        }
    }

    /// Entry for an import that was rejected or failed to persist
    pub fn failed(strategy: ImportStrategy, source: impl Into<String>, error: &GajikuError) -> Self {
        let detail = match error {
            GajikuError::Validation { detail, .. } => detail.clone(),
            other => other.to_string(),
        };

        Self {
            timestamp: Utc::now(),
            strategy,
            outcome: ImportOutcome::Failed,
            source: source.into(),
            device_id: None,
            schema_version: None,
            counts: None,
            error_kind: error.validation_kind(),
            error: Some(detail),
        }
    }

    /// One-line description for listings
    pub fn summary(&self) -> String {
        match (&self.counts, &self.error) {
            (Some(c), _) => format!(
                "+{} ~{} -{} ={} !{}",
                c.added, c.updated, c.deleted, c.skipped, c.conflicts
            ),
            (None, Some(error)) => match self.error_kind {
                Some(kind) => format!("{}: {}", kind, error),
                None => error.clone(),
            },
            (None, None) => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::BackupEnvelope;
    use crate::models::AppData;

    fn result() -> ImportResult {
        ImportResult {
            strategy: ImportStrategy::SmartMerge,
            success: true,
            counts: MergeCounts {
                added: 2,
                conflicts: 1,
                ..MergeCounts::default()
            },
            source_schema_version: 0,
            migrated: true,
            settings_replaced: false,
            backup: BackupEnvelope::with_exported_at(AppData::default(), "phone", 1).meta,
        }
    }

    #[test]
    fn test_completed_entry() {
        let entry = ImportAuditEntry::completed("backup.json", &result(), false);

        assert_eq!(entry.outcome, ImportOutcome::Applied);
        assert_eq!(entry.device_id.as_deref(), Some("phone"));
        assert_eq!(entry.schema_version, Some(0));
        assert_eq!(entry.summary(), "+2 ~0 -0 =0 !1");
    }

    #[test]
    fn test_preview_entry() {
        let entry = ImportAuditEntry::completed("backup.json", &result(), true);
        assert_eq!(entry.outcome, ImportOutcome::Previewed);
    }

    #[test]
    fn test_failed_entry_keeps_kind() {
        let error = GajikuError::validation(ValidationErrorKind::SchemaTooNew, "v2 > v1");
        let entry = ImportAuditEntry::failed(ImportStrategy::FullReplace, "new.json", &error);

        assert_eq!(entry.outcome, ImportOutcome::Failed);
        assert_eq!(entry.error_kind, Some(ValidationErrorKind::SchemaTooNew));
        assert_eq!(entry.summary(), "SCHEMA_TOO_NEW: v2 > v1");
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let error = GajikuError::Storage("disk full".into());
        let entry = ImportAuditEntry::failed(ImportStrategy::SmartMerge, "x.json", &error);
        let json = serde_json::to_string(&entry).unwrap();

        assert!(json.contains("\"strategy\":\"smart_merge\""));
        assert!(json.contains("\"outcome\":\"failed\""));
        assert!(!json.contains("counts"));
        assert!(!json.contains("error_kind"));
    }
}
