//! Storage layer for Gajiku
//!
//! The import engine never touches persistence directly. It reads and writes
//! whole snapshots through [`StorageAdapter`]; this module defines that seam
//! and provides a JSON file implementation and an in-memory one.

pub mod file_io;
pub mod init;
pub mod json_store;
pub mod memory;

pub use file_io::{read_json, write_atomic, write_json_atomic};
pub use init::{initialize_storage, InitReport};
pub use json_store::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::GajikuResult;
use crate::models::AppData;

/// Whole-snapshot persistence consumed by the import engine
///
/// At most one import should run against an adapter at a time; serializing
/// callers is the adapter owner's job.
#[allow(async_fn_in_trait)]
pub trait StorageAdapter {
    /// Read the complete local snapshot
    async fn get_all(&self) -> GajikuResult<AppData>;

    /// Replace the stored snapshot. Must be all-or-nothing.
    async fn save_all(&self, data: AppData) -> GajikuResult<()>;
}
