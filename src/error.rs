//! Custom error types for Gajiku
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Discriminates why an incoming backup was rejected by the validator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationErrorKind {
    /// Input is not parsable JSON
    InvalidJson,
    /// Root is not an object, or the format tag is wrong
    WrongFormat,
    /// The `meta` section is missing or not an object
    MissingMeta,
    /// The `data` section is missing or not an object
    MissingData,
    /// The backup was written by a newer schema than this build understands
    SchemaTooNew,
    /// `data.transactions` is not an array
    MissingTransactions,
}

impl ValidationErrorKind {
    /// Stable wire name of the kind (e.g. `SCHEMA_TOO_NEW`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidJson => "INVALID_JSON",
            Self::WrongFormat => "WRONG_FORMAT",
            Self::MissingMeta => "MISSING_META",
            Self::MissingData => "MISSING_DATA",
            Self::SchemaTooNew => "SCHEMA_TOO_NEW",
            Self::MissingTransactions => "MISSING_TRANSACTIONS",
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The main error type for Gajiku operations
#[derive(Error, Debug)]
pub enum GajikuError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Backup rejected before any data was trusted
    #[error("Invalid backup ({kind}): {detail}")]
    Validation {
        kind: ValidationErrorKind,
        detail: String,
    },

    /// A validated backup could not be brought to the current schema
    #[error("Migration error: {0}")]
    Migration(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl GajikuError {
    /// Create a validation error of the given kind
    pub fn validation(kind: ValidationErrorKind, detail: impl Into<String>) -> Self {
        Self::Validation {
            kind,
            detail: detail.into(),
        }
    }

    /// Create a "not found" error for backup files
    pub fn backup_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Backup",
            identifier: identifier.into(),
        }
    }

    /// The validation kind, if this is a validation error
    pub fn validation_kind(&self) -> Option<ValidationErrorKind> {
        match self {
            Self::Validation { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<std::io::Error> for GajikuError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for GajikuError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for Gajiku operations
pub type GajikuResult<T> = Result<T, GajikuError>;
