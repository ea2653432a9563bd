//! Record reconciliation
//!
//! Last-writer-wins over `updatedAt`, with soft-delete tombstones taking part
//! in the ordering. The routines here are pure: they take the local snapshot
//! and a decoded backup and return the merged snapshot plus counters.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::envelope::BackupEnvelope;
use crate::config::SettingsMergePolicy;
use crate::models::{AppData, AppSettings, Record, Timestamp};

/// Outcome counters, aggregated over all four collections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeCounts {
    pub added: usize,
    pub updated: usize,
    pub skipped: usize,
    pub deleted: usize,
    pub conflicts: usize,
}

impl MergeCounts {
    /// Records that changed local state
    pub fn changed(&self) -> usize {
        self.added + self.updated + self.deleted
    }
}

/// What to do with one incoming record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Overwrite,
    Tombstone,
    KeepLocal,
    Conflict,
}

fn resolve<R: Record>(local: &R, incoming: &R) -> Resolution {
    match (local.deleted_at(), incoming.deleted_at()) {
        (None, Some(deleted_at)) => {
            if deleted_at > local.updated_at() {
                Resolution::Tombstone
            } else {
                Resolution::KeepLocal
            }
        }
        (Some(deleted_at), None) => {
            if incoming.updated_at() > deleted_at {
                Resolution::Overwrite
            } else {
                Resolution::KeepLocal
            }
        }
        _ => {
            if incoming.updated_at() > local.updated_at() {
                Resolution::Overwrite
            } else if incoming.updated_at() == local.updated_at() && !local.same_content(incoming) {
                Resolution::Conflict
            } else {
                Resolution::KeepLocal
            }
        }
    }
}

/// Take an incoming record in place of a local one
fn accept<R: Record>(local: &R, incoming: &R) -> R {
    let mut merged = incoming.clone();
    merged.settle();
    let meta = merged.meta_mut();
    meta.updated_at = meta.updated_at.max(local.updated_at());
    merged
}

/// Merge one collection.
///
/// Local records keep their order; new records are appended in the order
/// they appear in `incoming`.
pub fn merge_collection<R: Record>(local: Vec<R>, incoming: &[R], counts: &mut MergeCounts) -> Vec<R> {
    let mut merged: Vec<R> = Vec::with_capacity(local.len() + incoming.len());
    let mut index: HashMap<String, usize> = HashMap::with_capacity(local.len());

    for record in local {
        match index.get(record.id()) {
            Some(&pos) => merged[pos] = record,
            None => {
                index.insert(record.id().to_string(), merged.len());
                merged.push(record);
            }
        }
    }

    for record in incoming {
        let Some(&pos) = index.get(record.id()) else {
            let mut inserted = record.clone();
            inserted.settle();
            index.insert(inserted.id().to_string(), merged.len());
            merged.push(inserted);
            counts.added += 1;
            continue;
        };

        match resolve(&merged[pos], record) {
            Resolution::Overwrite => {
                merged[pos] = accept(&merged[pos], record);
                counts.updated += 1;
            }
            Resolution::Tombstone => {
                merged[pos] = accept(&merged[pos], record);
                counts.deleted += 1;
            }
            Resolution::Conflict => {
                debug!(id = record.id(), "equal timestamps with different content, keeping local");
                counts.skipped += 1;
                counts.conflicts += 1;
            }
            Resolution::KeepLocal => counts.skipped += 1,
        }
    }

    merged
}

/// Decide which settings survive an import.
///
/// Returns the settings to keep and whether the incoming ones were adopted.
pub fn merge_settings(
    local: AppSettings,
    incoming: AppSettings,
    exported_at: Timestamp,
    policy: SettingsMergePolicy,
) -> (AppSettings, bool) {
    let adopt = match policy {
        SettingsMergePolicy::NewerExport => exported_at > local.exported_at.unwrap_or(0),
        SettingsMergePolicy::PreferIncoming => true,
        SettingsMergePolicy::KeepLocal => false,
    };

    if adopt {
        let mut adopted = incoming;
        adopted.exported_at = Some(exported_at);
        (adopted, true)
    } else {
        (local, false)
    }
}

/// Result of merging a backup into the local snapshot
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub data: AppData,
    pub counts: MergeCounts,
    pub settings_replaced: bool,
}

/// Merge every collection and the settings of `envelope` into `local`
pub fn merge_app_data(local: AppData, envelope: &BackupEnvelope, policy: SettingsMergePolicy) -> MergeOutcome {
    let mut counts = MergeCounts::default();
    let incoming = &envelope.data;

    let (settings, settings_replaced) = merge_settings(
        local.settings,
        incoming.settings.clone(),
        envelope.meta.exported_at,
        policy,
    );

    let mut data = AppData {
        transactions: merge_collection(local.transactions, &incoming.transactions, &mut counts),
        budgets: merge_collection(local.budgets, &incoming.budgets, &mut counts),
        savings_goals: merge_collection(local.savings_goals, &incoming.savings_goals, &mut counts),
        notifications: merge_collection(local.notifications, &incoming.notifications, &mut counts),
        settings,
    };
    data.reset_budget_spent();

    MergeOutcome {
        data,
        counts,
        settings_replaced,
    }
}
