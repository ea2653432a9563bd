//! Import history
//!
//! Every import run from the command line is recorded in an append-only
//! JSON Lines file, including rejected files and failed writes.

mod entry;
mod history_log;

pub use entry::{ImportAuditEntry, ImportOutcome};
pub use history_log::ImportHistoryLog;
