//! Backup CLI commands
//!
//! Manages the timestamped backup files kept in the backups directory.

use clap::Subcommand;

use crate::backup::{parse_backup, BackupEnvelope, BackupManager};
use crate::config::paths::GajikuPaths;
use crate::config::settings::Settings;
use crate::error::GajikuResult;
use crate::storage::{JsonFileStore, StorageAdapter};

use super::import::print_backup_summary;

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Create a new backup of local data
    Create,

    /// List all available backups
    List {
        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show information about a specific backup
    Info {
        /// Backup filename or path (use 'latest' for most recent)
        backup: String,
    },

    /// Delete backups beyond the retention count
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a backup command
pub async fn handle_backup_command(
    paths: &GajikuPaths,
    settings: &Settings,
    cmd: BackupCommands,
) -> GajikuResult<()> {
    let retention = settings.backup_retention.clone();
    let manager = BackupManager::new(paths, retention.clone());

    match cmd {
        BackupCommands::Create => {
            println!("Creating backup...");
            let data = JsonFileStore::new(paths).get_all().await?;
            let envelope = BackupEnvelope::from_app_data(data, settings.device_id.clone());
            let (backup_path, pruned) =
                manager.create_backup_with_retention(&envelope, settings.pretty_export)?;
            let filename = backup_path
                .file_name()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| backup_path.display().to_string());
            println!("Backup created: {}", filename);
            println!("Location: {}", backup_path.display());
            if !pruned.is_empty() {
                println!("Pruned {} old backup(s).", pruned.len());
            }
        }

        BackupCommands::List { verbose } => {
            let backups = manager.list_backups()?;

            if backups.is_empty() {
                println!("No backups found.");
                println!("Create one with: gajiku backup create");
                return Ok(());
            }

            println!("Available Backups");
            println!("=================");
            println!();

            for (i, backup) in backups.iter().enumerate() {
                let age = chrono::Utc::now().signed_duration_since(backup.created_at);
                let records = backup
                    .meta
                    .as_ref()
                    .map(|m| format!("{} records", m.record_counts.total()))
                    .unwrap_or_else(|| "unreadable".to_string());

                if verbose {
                    println!(
                        "{}. {}\n   Created: {}\n   Size: {}\n   Age: {}\n   Contents: {}\n",
                        i + 1,
                        backup.filename,
                        backup.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                        format_size(backup.size_bytes),
                        format_duration(age),
                        records,
                    );
                } else {
                    println!(
                        "  {}. {} ({} ago, {}, {})",
                        i + 1,
                        backup.filename,
                        format_duration(age),
                        format_size(backup.size_bytes),
                        records,
                    );
                }
            }

            println!();
            println!("Total: {} backup(s)", backups.len());
        }

        BackupCommands::Info { backup } => {
            let backup_path = manager.resolve(&backup)?;
            let metadata = std::fs::metadata(&backup_path)?;
            let raw = std::fs::read_to_string(&backup_path)?;
            let parsed = parse_backup(&raw)?;

            println!("Backup Details");
            println!("==============");
            println!("File: {}", backup_path.display());
            println!("Size: {}", format_size(metadata.len()));
            println!("Schema version: {}", parsed.source_schema_version);
            print_backup_summary(&parsed.envelope.meta);
        }

        BackupCommands::Prune { force } => {
            let backups = manager.list_backups()?;
            let to_delete = backups.len().saturating_sub(retention.keep_count as usize);

            if to_delete == 0 {
                println!("No backups to prune.");
                println!(
                    "Retention policy keeps {} backup(s); you have {}.",
                    retention.keep_count,
                    backups.len()
                );
                return Ok(());
            }

            println!("Prune Summary");
            println!("=============");
            println!("Retention policy: keep {}", retention.keep_count);
            println!("Current backups: {}", backups.len());
            println!("To be deleted: {}", to_delete);
            println!();

            if !force {
                println!("To delete old backups, run again with --force flag:");
                println!("  gajiku backup prune --force");
                return Ok(());
            }

            let deleted = manager.enforce_retention()?;
            println!("Deleted {} backup(s).", deleted.len());
        }
    }

    Ok(())
}

/// Format a duration in human-readable form
fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    let days = hours / 24;
    if days < 30 {
        return format!("{}d", days);
    }

    format!("{}mo", days / 30)
}

/// Format a file size in human-readable form
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(chrono::Duration::seconds(5)), "5s");
        assert_eq!(format_duration(chrono::Duration::minutes(90)), "1h");
        assert_eq!(format_duration(chrono::Duration::days(65)), "2mo");
        assert_eq!(format_duration(chrono::Duration::seconds(-3)), "0s");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
