//! Backup validation
//!
//! Structural checks on an untrusted backup before any of its data is
//! trusted. Checks run in a fixed order and the first failure wins. Individual
//! records are not inspected here.

use serde_json::{Map, Value};

use super::envelope::{BACKUP_FORMAT, SCHEMA_VERSION};
use crate::error::{GajikuError, GajikuResult, ValidationErrorKind};

/// A structurally valid backup document, not yet migrated
#[derive(Debug, Clone)]
pub struct ValidatedBackup {
    /// Parsed document
    pub document: Value,
    /// Schema version declared by the file (0 when absent)
    pub schema_version: i64,
    /// The file predates the current schema and must be migrated
    pub needs_migration: bool,
}

/// Validate raw backup text
pub fn validate_backup(raw: &str) -> GajikuResult<ValidatedBackup> {
    let document: Value = serde_json::from_str(raw)
        .map_err(|e| GajikuError::validation(ValidationErrorKind::InvalidJson, e.to_string()))?;

    let root = document.as_object().ok_or_else(|| {
        GajikuError::validation(ValidationErrorKind::WrongFormat, "Root must be an object")
    })?;

    let meta = root.get("meta").and_then(Value::as_object).ok_or_else(|| {
        GajikuError::validation(ValidationErrorKind::MissingMeta, "meta field is required")
    })?;

    match meta.get("format") {
        Some(Value::String(format)) if format == BACKUP_FORMAT => {}
        other => {
            return Err(GajikuError::validation(
                ValidationErrorKind::WrongFormat,
                format!(
                    "Expected format \"{}\", got {}",
                    BACKUP_FORMAT,
                    other.map_or_else(|| "nothing".to_string(), Value::to_string)
                ),
            ))
        }
    }

    let schema_version = declared_schema_version(meta)?;
    if schema_version > i64::from(SCHEMA_VERSION) {
        return Err(GajikuError::validation(
            ValidationErrorKind::SchemaTooNew,
            format!(
                "Backup was created with schema v{}, this build only supports v{}. Please update the app.",
                schema_version, SCHEMA_VERSION
            ),
        ));
    }

    let data = root.get("data").and_then(Value::as_object).ok_or_else(|| {
        GajikuError::validation(ValidationErrorKind::MissingData, "data field is required")
    })?;

    if !data.get("transactions").is_some_and(Value::is_array) {
        return Err(GajikuError::validation(
            ValidationErrorKind::MissingTransactions,
            "data.transactions must be an array",
        ));
    }

    Ok(ValidatedBackup {
        needs_migration: schema_version < i64::from(SCHEMA_VERSION),
        schema_version,
        document,
    })
}

/// Read `meta.schemaVersion`, falling back to the legacy `meta.version`.
/// Absent (or null) means version 0.
fn declared_schema_version(meta: &Map<String, Value>) -> GajikuResult<i64> {
    let declared = [meta.get("schemaVersion"), meta.get("version")]
        .into_iter()
        .flatten()
        .find(|v| !v.is_null());

    let Some(value) = declared else {
        return Ok(0);
    };

    let version = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    version.ok_or_else(|| {
        GajikuError::validation(
            ValidationErrorKind::WrongFormat,
            format!("schemaVersion must be an integer, got {}", value),
        )
    })
}
