//! Path management for Gajiku
//!
//! Provides XDG-compliant path resolution for configuration, data, and backups.
//!
//! ## Path Resolution Order
//!
//! 1. `GAJIKU_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/gajiku` or `~/.config/gajiku`
//! 3. Windows: `%APPDATA%\gajiku`

use std::path::PathBuf;

use crate::error::GajikuError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "GAJIKU_DATA_DIR";

/// Manages all paths used by Gajiku
#[derive(Debug, Clone)]
pub struct GajikuPaths {
    /// Base directory for all Gajiku data
    base_dir: PathBuf,
}

impl GajikuPaths {
    /// Create a new GajikuPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, GajikuError> {
        let base_dir = if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create GajikuPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.config/gajiku/ or equivalent)
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (~/.config/gajiku/data/)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the backup directory (~/.config/gajiku/backups/)
    pub fn backup_dir(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    /// Get the path to the tool configuration file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the import history log
    pub fn import_history_log(&self) -> PathBuf {
        self.base_dir.join("import_history.log")
    }

    /// Get the path to the local snapshot
    pub fn app_data_file(&self) -> PathBuf {
        self.data_dir().join("app_data.json")
    }

    /// Get the path to the file recording the local snapshot's schema version
    pub fn schema_version_file(&self) -> PathBuf {
        self.data_dir().join("schema_version")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), GajikuError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| GajikuError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| GajikuError::Io(format!("Failed to create data directory: {}", e)))?;

        std::fs::create_dir_all(self.backup_dir())
            .map_err(|e| GajikuError::Io(format!("Failed to create backup directory: {}", e)))?;

        Ok(())
    }

    /// Check if Gajiku has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

/// Resolve the default data directory path based on platform
#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, GajikuError> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg).join("gajiku"));
    }
    let home = std::env::var("HOME")
        .map_err(|_| GajikuError::Config("HOME environment variable not set".into()))?;
    Ok(PathBuf::from(home).join(".config").join("gajiku"))
}

/// Resolve the default data directory path based on platform
#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, GajikuError> {
    let appdata = std::env::var("APPDATA")
        .map_err(|_| GajikuError::Config("Could not determine APPDATA directory".into()))?;
    Ok(PathBuf::from(appdata).join("gajiku"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = GajikuPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
        assert_eq!(paths.backup_dir(), temp_dir.path().join("backups"));
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = GajikuPaths::with_base_dir(temp_dir.path().to_path_buf());

        paths.ensure_directories().unwrap();

        assert!(paths.data_dir().exists());
        assert!(paths.backup_dir().exists());
        assert!(!paths.is_initialized());
    }

    #[test]
    fn test_file_paths() {
        let temp_dir = TempDir::new().unwrap();
        let paths = GajikuPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(
            paths.app_data_file(),
            temp_dir.path().join("data").join("app_data.json")
        );
        assert_eq!(
            paths.import_history_log(),
            temp_dir.path().join("import_history.log")
        );
    }
}
