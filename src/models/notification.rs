//! Notification model
//!
//! The app may hard-delete notifications, but backups always carry them as
//! soft-deletable records so the merge can compare their timestamps.

use serde::{Deserialize, Serialize};

use super::record::{impl_record, Record, RecordMeta, Timestamp};

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Success,
    #[default]
    Info,
}

/// An in-app notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(flatten)]
    pub meta: RecordMeta,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub message: String,

    #[serde(rename = "type", default)]
    pub severity: Severity,

    #[serde(default)]
    pub read: bool,
}

impl_record!(Notification);

impl Notification {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
        now: Timestamp,
    ) -> Self {
        Self {
            meta: RecordMeta::new(id, now),
            title: title.into(),
            message: message.into(),
            severity,
            read: false,
        }
    }

    pub fn mark_read(&mut self, now: Timestamp) {
        self.read = true;
        self.touch(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_uses_type_key() {
        let n = Notification::new("n-1", "Budget", "Food budget at 90%", Severity::Warning, 5);
        let value = serde_json::to_value(&n).unwrap();
        assert_eq!(value["type"], "warning");
        assert_eq!(value["read"], false);
    }

    #[test]
    fn test_mark_read_touches() {
        let mut n = Notification::new("n-1", "t", "m", Severity::Info, 5);
        n.mark_read(9);
        assert!(n.read);
        assert_eq!(n.updated_at(), 9);
    }
}
