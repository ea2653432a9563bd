//! Export CLI command
//!
//! Writes the local snapshot as a backup envelope, either to a chosen file
//! or into the managed backups directory.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use crate::backup::{export_backup, suggested_filename, BackupEnvelope, BackupManager};
use crate::config::paths::GajikuPaths;
use crate::config::settings::Settings;
use crate::error::{GajikuError, GajikuResult};
use crate::storage::{write_atomic, JsonFileStore, StorageAdapter};

/// Arguments for `gajiku export`
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file path (default: a new file in the backups directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

/// Handle the export command
pub async fn handle_export_command(
    paths: &GajikuPaths,
    settings: &Settings,
    args: ExportArgs,
) -> GajikuResult<()> {
    let store = JsonFileStore::new(paths);
    let pretty = settings.pretty_export && !args.compact;

    match args.output {
        Some(output) => {
            // the target is only replaced once the snapshot has been read
            let mut buffer = Vec::new();
            let meta = export_backup(&store, &settings.device_id, &mut buffer, pretty).await?;
            write_atomic(&output, |writer| {
                writer.write_all(&buffer).map_err(|e| {
                    GajikuError::Export(format!("Failed to write {}: {}", output.display(), e))
                })
            })?;

            println!("Backup exported to: {}", output.display());
            println!(
                "Records: {} transactions, {} budgets, {} savings goals, {} notifications",
                meta.record_counts.transactions,
                meta.record_counts.budgets,
                meta.record_counts.savings_goals,
                meta.record_counts.notifications,
            );
        }
        None => {
            let data = store.get_all().await?;
            let envelope = BackupEnvelope::from_app_data(data, settings.device_id.clone());
            let manager = BackupManager::new(paths, settings.backup_retention.clone());

            let (path, pruned) = manager.create_backup_with_retention(&envelope, pretty)?;

            println!("Backup exported to: {}", path.display());
            println!("Records: {}", envelope.meta.record_counts.total());
            if !pruned.is_empty() {
                println!("Pruned {} old backup(s).", pruned.len());
            }
            if let Some(date) = envelope.meta.exported_at_utc() {
                println!(
                    "Tip: share it as {} to import on another device.",
                    suggested_filename(date.date_naive())
                );
            }
        }
    }

    Ok(())
}
