//! The import history file
//!
//! One JSON object per line. A line that no longer parses (for instance a
//! write cut short by a crash) is skipped with a warning, and the next append
//! starts on a fresh line.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{GajikuError, GajikuResult};

use super::entry::ImportAuditEntry;

/// Append-only record of past imports
pub struct ImportHistoryLog {
    path: PathBuf,
}

impl ImportHistoryLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record one import
    pub fn append(&self, entry: &ImportAuditEntry) -> GajikuResult<()> {
        let mut line = serde_json::to_string(entry)
            .map_err(|e| GajikuError::Json(format!("Import history entry not serializable: {}", e)))?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error("open", e))?;

        if ends_mid_line(&mut file).map_err(|e| self.io_error("read", e))? {
            line.insert(0, '\n');
        }

        // one write per entry
        file.write_all(line.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| self.io_error("append to", e))
    }

    /// Every recorded import, oldest first
    pub fn entries(&self) -> GajikuResult<Vec<ImportAuditEntry>> {
        let mut entries = Vec::new();
        self.scan(|entry| entries.push(entry))?;
        Ok(entries)
    }

    /// The last `limit` imports, oldest first
    pub fn recent(&self, limit: usize) -> GajikuResult<Vec<ImportAuditEntry>> {
        let mut window = VecDeque::with_capacity(limit);
        self.scan(|entry| {
            if limit == 0 {
                return;
            }
            if window.len() == limit {
                window.pop_front();
            }
            window.push_back(entry);
        })?;
        Ok(window.into())
    }

    /// Number of readable entries
    pub fn len(&self) -> GajikuResult<usize> {
        let mut count = 0;
        self.scan(|_| count += 1)?;
        Ok(count)
    }

    pub fn is_empty(&self) -> GajikuResult<bool> {
        Ok(self.len()? == 0)
    }

    fn scan(&self, mut visit: impl FnMut(ImportAuditEntry)) -> GajikuResult<()> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(self.io_error("open", e)),
        };

        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| self.io_error("read", e))?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(entry) => visit(entry),
                Err(e) => warn!(line = index + 1, error = %e, "skipping unreadable import history line"),
            }
        }

        Ok(())
    }

    fn io_error(&self, action: &str, e: std::io::Error) -> GajikuError {
        GajikuError::Io(format!("Cannot {} import history {}: {}", action, self.path.display(), e))
    }
}

/// True when the last write stopped before its newline
fn ends_mid_line(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::ImportStrategy;
    use tempfile::TempDir;

    fn history() -> (ImportHistoryLog, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let log = ImportHistoryLog::new(temp_dir.path().join("import_history.log"));
        (log, temp_dir)
    }

    fn rejected(source: &str) -> ImportAuditEntry {
        ImportAuditEntry::failed(
            ImportStrategy::SmartMerge,
            source,
            &GajikuError::Storage("disk full".into()),
        )
    }

    #[test]
    fn test_append_then_read_back() {
        let (log, _temp) = history();
        log.append(&rejected("phone.json")).unwrap();

        let entries = log.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source, "phone.json");
        assert_eq!(entries[0].strategy, ImportStrategy::SmartMerge);
    }

    #[test]
    fn test_recent_keeps_the_tail() {
        let (log, _temp) = history();
        for i in 0..10 {
            log.append(&rejected(&format!("{}.json", i))).unwrap();
        }

        assert_eq!(log.len().unwrap(), 10);

        let recent = log.recent(3).unwrap();
        let sources: Vec<&str> = recent.iter().map(|e| e.source.as_str()).collect();
        assert_eq!(sources, ["7.json", "8.json", "9.json"]);
        assert!(log.recent(0).unwrap().is_empty());
    }

    #[test]
    fn test_no_history_yet() {
        let (log, _temp) = history();

        assert!(log.is_empty().unwrap());
        assert!(log.entries().unwrap().is_empty());
        assert!(log.recent(5).unwrap().is_empty());
    }

    #[test]
    fn test_torn_line_is_skipped() {
        let (log, _temp) = history();
        log.append(&rejected("a.json")).unwrap();
        let mut file = OpenOptions::new().append(true).open(log.path()).unwrap();
        file.write_all(b"{\"timestamp\":\"2025-").unwrap();
        drop(file);
        log.append(&rejected("b.json")).unwrap();

        let sources: Vec<String> = log.entries().unwrap().into_iter().map(|e| e.source).collect();
        assert_eq!(sources, ["a.json", "b.json"]);
        assert_eq!(log.len().unwrap(), 2);
    }
}
