//! Snapshot and backup file access
//!
//! Everything that replaces a file on disk goes through [`write_atomic`]:
//! the new contents are staged in a sibling `.tmp` file, synced, then renamed
//! over the target, so readers see either the old file or the new one.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{GajikuError, GajikuResult};

/// Load a JSON document, falling back to `T::default()` when the file is absent
pub fn read_json<T, P>(path: P) -> GajikuResult<T>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| GajikuError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| GajikuError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Staging path next to `path`: `name.json` becomes `name.json.tmp`
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("gajiku"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Replace `path` with whatever `fill` writes.
///
/// If `fill` fails, or any step before the rename does, the target is left
/// untouched and the staging file is removed. Errors from `fill` are returned
/// as-is.
pub fn write_atomic<P, F>(path: P, fill: F) -> GajikuResult<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<File>) -> GajikuResult<()>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            GajikuError::Storage(format!("Failed to create directory {}: {}", parent.display(), e))
        })?;
    }

    let staging = staging_path(path);
    let file = File::create(&staging).map_err(|e| {
        GajikuError::Storage(format!("Failed to create {}: {}", staging.display(), e))
    })?;

    let mut writer = BufWriter::new(file);
    let staged = fill(&mut writer).and_then(|()| {
        writer
            .flush()
            .map_err(|e| GajikuError::Storage(format!("Failed to flush {}: {}", staging.display(), e)))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| GajikuError::Storage(format!("Failed to sync {}: {}", staging.display(), e)))
    });
    drop(writer);

    if let Err(e) = staged {
        let _ = fs::remove_file(&staging);
        return Err(e);
    }

    fs::rename(&staging, path).map_err(|e| {
        let _ = fs::remove_file(&staging);
        GajikuError::Storage(format!("Failed to replace {}: {}", path.display(), e))
    })
}

/// Write `data` as pretty JSON through [`write_atomic`]
pub fn write_json_atomic<T, P>(path: P, data: &T) -> GajikuResult<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    write_atomic(path, |writer| {
        serde_json::to_writer_pretty(writer, data)
            .map_err(|e| GajikuError::Storage(format!("Failed to serialize data: {}", e)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct Marker {
        label: String,
        revision: u32,
    }

    #[test]
    fn test_missing_file_reads_as_default() {
        let temp_dir = TempDir::new().unwrap();

        let marker: Marker = read_json(temp_dir.path().join("absent.json")).unwrap();
        assert_eq!(marker, Marker::default());
    }

    #[test]
    fn test_json_written_then_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("marker.json");
        let marker = Marker {
            label: "snapshot".to_string(),
            revision: 3,
        };

        write_json_atomic(&path, &marker).unwrap();

        assert_eq!(read_json::<Marker, _>(&path).unwrap(), marker);
        assert!(!temp_dir.path().join("nested").join("marker.json.tmp").exists());
    }

    #[test]
    fn test_failed_fill_keeps_previous_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("backup.json");
        fs::write(&path, "previous").unwrap();

        let result = write_atomic(&path, |writer| {
            writer.write_all(b"partial").unwrap();
            Err(GajikuError::Export("snapshot unavailable".into()))
        });

        assert!(matches!(result, Err(GajikuError::Export(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "previous");
        assert!(!temp_dir.path().join("backup.json.tmp").exists());
    }

    #[test]
    fn test_failed_fill_creates_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fresh.json");

        let _ = write_atomic(&path, |_| Err(GajikuError::Storage("boom".into())));

        assert!(!path.exists());
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_unparsable_file_is_a_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        fs::write(&path, "not json at all").unwrap();

        let result: GajikuResult<Marker> = read_json(&path);
        assert!(matches!(result, Err(GajikuError::Storage(_))));
    }
}
