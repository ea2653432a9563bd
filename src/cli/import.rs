//! Validate and import CLI commands

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};

use crate::audit::{ImportAuditEntry, ImportHistoryLog};
use crate::backup::{
    parse_backup, BackupEnvelope, BackupImporter, BackupManager, BackupMeta, ImportOptions,
    ImportResult, ImportStrategy, MergeCounts, ParsedBackup,
};
use crate::config::paths::GajikuPaths;
use crate::config::settings::Settings;
use crate::error::{GajikuError, GajikuResult};
use crate::storage::{JsonFileStore, StorageAdapter};

/// Import strategy as named on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Reconcile record by record, newest change wins
    Merge,
    /// Discard local data and adopt the backup
    Replace,
}

impl From<StrategyArg> for ImportStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Merge => ImportStrategy::SmartMerge,
            StrategyArg::Replace => ImportStrategy::FullReplace,
        }
    }
}

/// Arguments for `gajiku import`
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Backup file to import
    pub file: PathBuf,

    /// How to treat existing local data
    #[arg(short, long, value_enum, default_value = "merge")]
    pub strategy: StrategyArg,

    /// Show what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Confirm a replace import
    #[arg(short, long)]
    pub force: bool,
}

/// Handle `gajiku validate`
pub fn handle_validate_command(file: &Path) -> GajikuResult<()> {
    let raw = read_backup_file(file)?;
    let parsed = parse_backup(&raw)?;

    println!("Backup is valid: {}", file.display());
    print_backup_summary(&parsed.envelope.meta);
    if parsed.migrated {
        println!(
            "Schema:     v{} (will be migrated to v{})",
            parsed.source_schema_version, parsed.envelope.meta.schema_version
        );
    }

    Ok(())
}

/// Handle `gajiku import`
pub async fn handle_import_command(
    paths: &GajikuPaths,
    settings: &Settings,
    args: ImportArgs,
) -> GajikuResult<()> {
    let strategy = ImportStrategy::from(args.strategy);
    let source = args.file.display().to_string();
    let history = ImportHistoryLog::new(paths.import_history_log());

    if strategy == ImportStrategy::FullReplace && !args.force && !args.dry_run {
        println!("WARNING: Replace discards ALL local transactions, budgets, goals,");
        println!("notifications and settings, and adopts the backup instead.");
        println!("A safety backup of the current data is taken first.");
        println!("To proceed, run again with --force flag:");
        println!("  gajiku import {} --strategy replace --force", source);
        return Ok(());
    }

    let outcome = run_import(paths, settings, strategy, &args).await;

    let entry = match &outcome {
        Ok(result) => ImportAuditEntry::completed(&source, result, args.dry_run),
        Err(e) => ImportAuditEntry::failed(strategy, &source, e),
    };
    if let Err(e) = history.append(&entry) {
        tracing::warn!(error = %e, "could not record import history");
    }

    let result = outcome?;
    print_import_result(&result, args.dry_run);
    Ok(())
}

async fn run_import(
    paths: &GajikuPaths,
    settings: &Settings,
    strategy: ImportStrategy,
    args: &ImportArgs,
) -> GajikuResult<ImportResult> {
    let raw = read_backup_file(&args.file)?;
    let store = JsonFileStore::new(paths);
    let importer = BackupImporter::new(ImportOptions {
        settings_policy: settings.settings_merge,
    });

    match (strategy, args.dry_run) {
        (ImportStrategy::SmartMerge, true) => importer.preview_smart_merge(&raw, &store).await,
        (ImportStrategy::FullReplace, true) => preview_replace(&raw, &store).await,
        (ImportStrategy::FullReplace, false) => {
            // reject bad files before taking the safety backup
            parse_backup(&raw)?;

            let local = store.get_all().await?;
            let safety = BackupEnvelope::from_app_data(local, settings.device_id.clone());
            let manager = BackupManager::new(paths, settings.backup_retention.clone());
            let path = manager.create_backup(&safety, settings.pretty_export)?;
            println!("Safety backup saved: {}", path.display());

            importer.full_replace(&raw, &store).await
        }
        (ImportStrategy::SmartMerge, false) => importer.smart_merge(&raw, &store).await,
    }
}

/// What a replace would do, without doing it
async fn preview_replace<S: StorageAdapter>(raw: &str, store: &S) -> GajikuResult<ImportResult> {
    let ParsedBackup {
        envelope,
        source_schema_version,
        migrated,
    } = parse_backup(raw)?;
    let local = store.get_all().await?;

    println!(
        "Replace would discard {} local record(s).",
        local.record_count()
    );

    Ok(ImportResult {
        strategy: ImportStrategy::FullReplace,
        success: true,
        counts: MergeCounts {
            added: envelope.data.record_count(),
            ..MergeCounts::default()
        },
        source_schema_version,
        migrated,
        settings_replaced: true,
        backup: envelope.meta,
    })
}

fn read_backup_file(file: &Path) -> GajikuResult<String> {
    std::fs::read_to_string(file)
        .map_err(|e| GajikuError::Io(format!("Failed to read {}: {}", file.display(), e)))
}

/// Print the header of a backup
pub(crate) fn print_backup_summary(meta: &BackupMeta) {
    let exported = meta
        .exported_at_utc()
        .map(|d| d.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string());

    println!("Exported:   {}", exported);
    if !meta.app_version.is_empty() {
        println!("App:        {}", meta.app_version);
    }
    if !meta.device_id.is_empty() {
        println!("Device:     {}", meta.device_id);
    }
    println!("Contents:");
    println!("  Transactions:  {}", meta.record_counts.transactions);
    println!("  Budgets:       {}", meta.record_counts.budgets);
    println!("  Savings goals: {}", meta.record_counts.savings_goals);
    println!("  Notifications: {}", meta.record_counts.notifications);
}

fn print_import_result(result: &ImportResult, dry_run: bool) {
    let heading = match (result.strategy, dry_run) {
        (_, true) => "Import Preview (nothing was written)",
        (ImportStrategy::FullReplace, false) => "Replace Complete",
        (ImportStrategy::SmartMerge, false) => "Merge Complete",
    };

    println!("{}", heading);
    println!("{}", "=".repeat(heading.len()));
    if result.migrated {
        println!(
            "Migrated from schema v{} to v{}",
            result.source_schema_version, result.backup.schema_version
        );
    }
    let counts = &result.counts;
    println!("  Added:     {}", counts.added);
    println!("  Updated:   {}", counts.updated);
    println!("  Deleted:   {}", counts.deleted);
    println!("  Skipped:   {}", counts.skipped);
    println!("  Conflicts: {}", counts.conflicts);
    println!(
        "Settings:  {}",
        if result.settings_replaced {
            "replaced from backup"
        } else {
            "kept local"
        }
    );
    if result.strategy == ImportStrategy::SmartMerge && counts.changed() == 0 && !dry_run {
        println!();
        println!("Local data already up to date.");
    }
    if counts.conflicts > 0 {
        println!();
        println!("Conflicting records kept their local version.");
    }
}
