//! Import history CLI command

use crate::audit::ImportHistoryLog;
use crate::config::paths::GajikuPaths;
use crate::error::GajikuResult;

/// Show the most recent `limit` imports, newest last
pub fn handle_history_command(paths: &GajikuPaths, limit: usize) -> GajikuResult<()> {
    let history = ImportHistoryLog::new(paths.import_history_log());
    let entries = history.recent(limit)?;

    if entries.is_empty() {
        println!("No imports recorded yet.");
        return Ok(());
    }

    println!("Import History");
    println!("==============");
    for entry in &entries {
        println!(
            "{}  {:<8} {:<12} {}  {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.outcome.to_string(),
            entry.strategy.to_string(),
            entry.source,
            entry.summary(),
        );
    }

    let total = history.len()?;
    if total > entries.len() {
        println!();
        println!("Showing {} of {} entries.", entries.len(), total);
    }

    Ok(())
}
