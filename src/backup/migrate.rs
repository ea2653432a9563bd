//! Schema migrations
//!
//! Migrations operate on the raw JSON document because legacy files do not
//! fit the current types (string timestamps, missing soft-delete fields).
//! Each migration is idempotent and tolerates missing or oddly shaped
//! fields. They run in ascending version order, after which the document is
//! stamped with the current version and decoded into a typed envelope.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::envelope::{BackupEnvelope, SCHEMA_VERSION};
use super::validate::ValidatedBackup;
use crate::error::{GajikuError, GajikuResult};
use crate::models::{now_ms, Timestamp};

/// One step in the upgrade path
struct Migration {
    /// Version the data conforms to after this step
    to_version: i64,
    description: &'static str,
    apply: fn(&mut Map<String, Value>, Timestamp),
}

const MIGRATIONS: &[Migration] = &[Migration {
    to_version: 1,
    description: "integer-millisecond timestamps and soft-delete fields",
    apply: migrate_v0_to_v1,
}];

/// Collections and the entity-specific date field each one carries
const COLLECTIONS: &[(&str, Option<&str>)] = &[
    ("transactions", Some("date")),
    ("budgets", None),
    ("savingsGoals", Some("deadline")),
    ("notifications", None),
];

/// Bring a validated backup to the current schema and decode it
pub fn migrate_backup(validated: ValidatedBackup) -> GajikuResult<BackupEnvelope> {
    migrate_backup_at(validated, now_ms())
}

/// Same as [`migrate_backup`] with an explicit "now" for defaulted timestamps
pub fn migrate_backup_at(validated: ValidatedBackup, now: Timestamp) -> GajikuResult<BackupEnvelope> {
    let ValidatedBackup {
        mut document,
        schema_version,
        ..
    } = validated;

    let root = document
        .as_object_mut()
        .ok_or_else(|| GajikuError::Migration("backup root is not an object".into()))?;

    if let Some(data) = root.get_mut("data") {
        migrate_data(data, schema_version, now)?;
    }

    if let Some(Value::Object(meta)) = root.get_mut("meta") {
        if schema_version < i64::from(SCHEMA_VERSION) {
            if let Some(exported_at) = meta.get("exportedAt").and_then(coerce_timestamp) {
                meta.insert("exportedAt".into(), Value::from(exported_at));
            }
        }
        meta.insert("schemaVersion".into(), Value::from(SCHEMA_VERSION));
    }

    serde_json::from_value(document)
        .map_err(|e| GajikuError::Migration(format!("Backup data does not match schema v{}: {}", SCHEMA_VERSION, e)))
}

/// Run every migration newer than `from_version` over a `data` section.
///
/// Returns the versions that were applied. Also used to upgrade the local
/// snapshot at startup.
pub fn migrate_data(data: &mut Value, from_version: i64, now: Timestamp) -> GajikuResult<Vec<i64>> {
    let data = data
        .as_object_mut()
        .ok_or_else(|| GajikuError::Migration("data section is not an object".into()))?;

    let mut applied = Vec::new();
    for migration in MIGRATIONS.iter().filter(|m| from_version < m.to_version) {
        (migration.apply)(data, now);
        info!(
            to_version = migration.to_version,
            "applied migration: {}", migration.description
        );
        applied.push(migration.to_version);
    }
    Ok(applied)
}

/// v0 → v1: timestamps become integer milliseconds, records gain
/// `deletedAt`/`isDirty`, budgets drop their cached `spent`.
fn migrate_v0_to_v1(data: &mut Map<String, Value>, now: Timestamp) {
    for (collection, date_field) in COLLECTIONS {
        let records = match data.remove(*collection) {
            Some(Value::Array(records)) => records,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                warn!(collection, found = %other, "collection is not an array, treating as empty");
                Vec::new()
            }
        };

        let migrated: Vec<Value> = records
            .into_iter()
            .filter_map(|record| match record {
                Value::Object(mut fields) => {
                    migrate_record_v1(&mut fields, *date_field, now);
                    if *collection == "budgets" {
                        fields.insert("spent".into(), Value::from(0));
                    }
                    Some(Value::Object(fields))
                }
                other => {
                    warn!(collection, found = %other, "dropping non-object record");
                    None
                }
            })
            .collect();

        data.insert((*collection).to_string(), Value::Array(migrated));
    }
}

fn migrate_record_v1(fields: &mut Map<String, Value>, date_field: Option<&str>, now: Timestamp) {
    let created_at = timestamp_or(fields.get("createdAt"), now);
    let updated_at = timestamp_or(fields.get("updatedAt"), now).max(created_at);
    fields.insert("createdAt".into(), Value::from(created_at));
    fields.insert("updatedAt".into(), Value::from(updated_at));

    if let Some(field) = date_field {
        let value = timestamp_or(fields.get(field), now);
        fields.insert(field.into(), Value::from(value));
    }

    let deleted_at = fields.get("deletedAt").and_then(|v| {
        let coerced = coerce_timestamp(v);
        if coerced.is_none() && !v.is_null() {
            warn!(value = %v, "unreadable deletedAt, keeping record active");
        }
        coerced
    });
    fields.insert("deletedAt".into(), deleted_at.map_or(Value::Null, Value::from));
    fields.insert("isDirty".into(), Value::Bool(false));
}

fn timestamp_or(value: Option<&Value>, now: Timestamp) -> Timestamp {
    value.and_then(coerce_timestamp).unwrap_or(now)
}

/// Interpret a JSON value as a millisecond timestamp
pub fn coerce_timestamp(value: &Value) -> Option<Timestamp> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => parse_timestamp_str(s),
        _ => None,
    }
}

/// Parse an ISO-8601 style timestamp string. Strings without an offset are
/// read as UTC.
pub fn parse_timestamp_str(s: &str) -> Option<Timestamp> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::validate::validate_backup;
    use crate::models::Record;
    use serde_json::json;

    const NOW: Timestamp = 1_750_000_000_000;

    fn v0_backup(data: Value) -> ValidatedBackup {
        let raw = json!({
            "meta": { "format": "gajiku-backup", "schemaVersion": 0, "exportedAt": "2024-05-01T00:00:00Z" },
            "data": data,
        })
        .to_string();
        validate_backup(&raw).unwrap()
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(parse_timestamp_str("1970-01-01T00:00:01Z"), Some(1000));
        assert_eq!(parse_timestamp_str("1970-01-01T00:00:01.500Z"), Some(1500));
        assert_eq!(parse_timestamp_str("1970-01-01T01:00:00+01:00"), Some(0));
        assert_eq!(parse_timestamp_str("1970-01-02"), Some(86_400_000));
        assert_eq!(parse_timestamp_str("1970-01-01T00:00:02"), Some(2000));
        assert_eq!(parse_timestamp_str("yesterday"), None);
    }

    #[test]
    fn test_coerce_numbers() {
        assert_eq!(coerce_timestamp(&json!(1234)), Some(1234));
        assert_eq!(coerce_timestamp(&json!(1234.9)), Some(1234));
        assert_eq!(coerce_timestamp(&json!(true)), None);
        assert_eq!(coerce_timestamp(&Value::Null), None);
    }

    #[test]
    fn test_v0_transaction_is_normalized() {
        let validated = v0_backup(json!({
            "transactions": [{
                "id": "t-1",
                "type": "expense",
                "amount": 15000,
                "category": "food",
                "note": "lunch",
                "date": "2024-03-15T12:00:00.000Z",
                "createdAt": "2024-03-15T12:00:00.000Z"
            }]
        }));

        let envelope = migrate_backup_at(validated, NOW).unwrap();
        let txn = &envelope.data.transactions[0];

        assert_eq!(envelope.meta.schema_version, SCHEMA_VERSION);
        assert_eq!(txn.date, 1_710_504_000_000);
        assert_eq!(txn.meta.created_at, 1_710_504_000_000);
        // missing updatedAt defaults to now
        assert_eq!(txn.meta.updated_at, NOW);
        assert_eq!(txn.meta.deleted_at, None);
        assert!(!txn.meta.is_dirty);
        assert_eq!(envelope.meta.exported_at, 1_714_521_600_000);
    }

    #[test]
    fn test_v0_missing_collections_become_empty() {
        let validated = v0_backup(json!({ "transactions": [] }));
        let envelope = migrate_backup_at(validated, NOW).unwrap();

        assert!(envelope.data.budgets.is_empty());
        assert!(envelope.data.savings_goals.is_empty());
        assert!(envelope.data.notifications.is_empty());
    }

    #[test]
    fn test_v0_budget_and_goal() {
        let validated = v0_backup(json!({
            "transactions": [],
            "budgets": [{ "id": "b-1", "category": "food", "limit": 500, "spent": 320, "createdAt": 10 }],
            "savingsGoals": [{ "id": "g-1", "name": "Bike", "targetAmount": 100, "deadline": "2025-01-01" }]
        }));

        let envelope = migrate_backup_at(validated, NOW).unwrap();
        let budget = &envelope.data.budgets[0];
        let goal = &envelope.data.savings_goals[0];

        assert_eq!(budget.spent, 0.0);
        assert_eq!(budget.meta.created_at, 10);
        assert_eq!(goal.deadline, 1_735_689_600_000);
        assert_eq!(goal.meta.created_at, NOW);
    }

    #[test]
    fn test_existing_tombstone_survives() {
        let validated = v0_backup(json!({
            "transactions": [{ "id": "t-1", "date": 1, "createdAt": 1, "updatedAt": 5, "deletedAt": 5 }]
        }));

        let envelope = migrate_backup_at(validated, NOW).unwrap();
        assert_eq!(envelope.data.transactions[0].deleted_at(), Some(5));
    }

    #[test]
    fn test_updated_never_before_created() {
        let validated = v0_backup(json!({
            "transactions": [{ "id": "t-1", "date": 1, "createdAt": 500, "updatedAt": 100 }]
        }));

        let envelope = migrate_backup_at(validated, NOW).unwrap();
        assert_eq!(envelope.data.transactions[0].updated_at(), 500);
    }

    #[test]
    fn test_v0_to_v1_is_idempotent() {
        let mut data = json!({
            "transactions": [{ "id": "t-1", "date": "2024-01-01", "createdAt": "2024-01-01" }],
            "budgets": [{ "id": "b-1", "spent": 9 }],
            "notifications": [{ "id": "n-1", "createdAt": 7, "updatedAt": 8, "deletedAt": 8 }],
            "settings": { "currency": "IDR" }
        });

        migrate_data(&mut data, 0, NOW).unwrap();
        let once = data.clone();
        migrate_data(&mut data, 0, NOW).unwrap();

        assert_eq!(data, once);
        assert_eq!(data["settings"]["currency"], "IDR");
    }

    #[test]
    fn test_current_version_is_untouched() {
        let mut data = json!({ "transactions": [{ "id": "t", "date": "not touched" }] });
        let applied = migrate_data(&mut data, 1, NOW).unwrap();

        assert!(applied.is_empty());
        assert_eq!(data["transactions"][0]["date"], "not touched");
    }

    #[test]
    fn test_undecodable_record_is_migration_error() {
        let validated = v0_backup(json!({ "transactions": [{ "amount": 5 }] }));
        let err = migrate_backup_at(validated, NOW).unwrap_err();
        assert!(matches!(err, GajikuError::Migration(_)));
    }

    #[test]
    fn test_non_object_records_dropped() {
        let validated = v0_backup(json!({ "transactions": [42, { "id": "t-1" }] }));
        let envelope = migrate_backup_at(validated, NOW).unwrap();
        assert_eq!(envelope.data.transactions.len(), 1);
    }
}
