//! Shared record shape
//!
//! Every mutable collection (transactions, budgets, savings goals,
//! notifications) carries the same bookkeeping fields. They live in
//! [`RecordMeta`], which each entity flattens into its own JSON object, and
//! are reached generically through the [`Record`] trait.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch
pub type Timestamp = i64;

/// Current wall-clock time in milliseconds
pub fn now_ms() -> Timestamp {
    Utc::now().timestamp_millis()
}

/// Bookkeeping fields shared by every record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMeta {
    /// Opaque identifier, stable for the lifetime of the record
    pub id: String,

    /// When the record was created
    pub created_at: Timestamp,

    /// When the record was last modified
    pub updated_at: Timestamp,

    /// When the record was soft-deleted (`None` while active)
    #[serde(default)]
    pub deleted_at: Option<Timestamp>,

    /// Local changes not yet captured in an export
    #[serde(default)]
    pub is_dirty: bool,
}

impl RecordMeta {
    /// Create metadata for a fresh record created at `now`
    pub fn new(id: impl Into<String>, now: Timestamp) -> Self {
        Self {
            id: id.into(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            is_dirty: true,
        }
    }
}

/// Access to the shared bookkeeping fields of a collection entity
///
/// The merge engine only ever looks at a record through this trait, so one
/// reconciliation routine serves all four collections.
pub trait Record: Clone + PartialEq {
    /// Shared fields
    fn meta(&self) -> &RecordMeta;

    /// Mutable shared fields
    fn meta_mut(&mut self) -> &mut RecordMeta;

    /// Reset fields that are derived locally and never compared or trusted
    /// from a backup. Most entities have none.
    fn clear_derived(&mut self) {}

    fn id(&self) -> &str {
        &self.meta().id
    }

    fn updated_at(&self) -> Timestamp {
        self.meta().updated_at
    }

    fn deleted_at(&self) -> Option<Timestamp> {
        self.meta().deleted_at
    }

    /// Whether the record is visible to the rest of the application
    fn is_active(&self) -> bool {
        self.meta().deleted_at.is_none()
    }

    /// Mark a record as changed locally at `now`
    fn touch(&mut self, now: Timestamp) {
        let meta = self.meta_mut();
        meta.updated_at = now.max(meta.created_at);
        meta.is_dirty = true;
    }

    /// Soft-delete the record at `now`
    fn soft_delete(&mut self, now: Timestamp) {
        self.meta_mut().deleted_at = Some(now);
        self.touch(now);
    }

    /// Prepare a record for being written by an import.
    ///
    /// Clears the dirty flag, resets derived fields and keeps
    /// `updated_at >= created_at`.
    fn settle(&mut self) {
        self.clear_derived();
        let meta = self.meta_mut();
        meta.is_dirty = false;
        if meta.updated_at < meta.created_at {
            meta.updated_at = meta.created_at;
        }
    }

    /// Compare two records ignoring the dirty flag and derived fields
    fn same_content(&self, other: &Self) -> bool {
        let mut a = self.clone();
        let mut b = other.clone();
        a.clear_derived();
        b.clear_derived();
        a.meta_mut().is_dirty = false;
        b.meta_mut().is_dirty = false;
        a == b
    }
}

/// Implement [`Record`] for an entity that stores its meta in a `meta` field
macro_rules! impl_record {
    ($ty:ty) => {
        impl $crate::models::record::Record for $ty {
            fn meta(&self) -> &$crate::models::record::RecordMeta {
                &self.meta
            }

            fn meta_mut(&mut self) -> &mut $crate::models::record::RecordMeta {
                &mut self.meta
            }
        }
    };
}

pub(crate) use impl_record;
