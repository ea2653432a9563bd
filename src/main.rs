use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gajiku::cli::{
    handle_backup_command, handle_export_command, handle_history_command, handle_import_command,
    handle_validate_command, BackupCommands, ExportArgs, ImportArgs,
};
use gajiku::config::{paths::GajikuPaths, settings::Settings};
use gajiku::storage::initialize_storage;

#[derive(Parser)]
#[command(
    name = "gajiku",
    version,
    about = "Backup and restore for the Gajiku finance tracker",
    long_about = "Exports the local Gajiku snapshot as a versioned backup file and \
                  imports backups from other devices, either replacing local data \
                  or merging it record by record."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize storage and upgrade the local snapshot if needed
    Init,

    /// Show current configuration and paths
    Config,

    /// Export local data as a backup file
    Export(ExportArgs),

    /// Check a backup file without importing it
    Validate {
        /// Backup file to check
        file: PathBuf,
    },

    /// Import a backup file
    Import(ImportArgs),

    /// Backup file management
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Show recent imports
    History {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = GajikuPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    // everything but init and config runs against a current snapshot
    let needs_storage = !matches!(cli.command, Some(Commands::Init | Commands::Config) | None);
    if needs_storage {
        let first_use = !paths.is_initialized();
        let report = initialize_storage(&paths)?;
        if let Some(from) = report.migrated_from {
            eprintln!(
                "Upgraded local data from schema v{} to v{}",
                from, report.schema_version
            );
        }
        // persist the generated device id on first use
        if first_use {
            settings.save(&paths)?;
        }
    }

    match cli.command {
        Some(Commands::Init) => {
            println!("Initializing Gajiku at: {}", paths.base_dir().display());
            let report = initialize_storage(&paths)?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            if report.created_defaults {
                println!("Created an empty snapshot at {}", paths.app_data_file().display());
            }
            if let Some(from) = report.migrated_from {
                println!(
                    "Upgraded local data from schema v{} to v{}",
                    from, report.schema_version
                );
            }
            println!("Device ID: {}", settings.device_id);
        }
        Some(Commands::Config) => {
            println!("Gajiku Configuration");
            println!("====================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data file:        {}", paths.app_data_file().display());
            println!("Backup directory: {}", paths.backup_dir().display());
            println!("Import history:   {}", paths.import_history_log().display());
            println!();
            println!("Settings:");
            println!("  Device ID:        {}", settings.device_id);
            println!("  Settings merge:   {}", settings.settings_merge);
            println!("  Pretty export:    {}", settings.pretty_export);
            println!("  Backups kept:     {}", settings.backup_retention.keep_count);
        }
        Some(Commands::Export(args)) => {
            handle_export_command(&paths, &settings, args).await?;
        }
        Some(Commands::Validate { file }) => {
            handle_validate_command(&file)?;
        }
        Some(Commands::Import(args)) => {
            handle_import_command(&paths, &settings, args).await?;
        }
        Some(Commands::Backup(cmd)) => {
            handle_backup_command(&paths, &settings, cmd).await?;
        }
        Some(Commands::History { limit }) => {
            handle_history_command(&paths, limit)?;
        }
        None => {
            println!("Gajiku - backup and restore for your finance data");
            println!();
            println!("Run 'gajiku --help' for usage information.");
        }
    }

    Ok(())
}
