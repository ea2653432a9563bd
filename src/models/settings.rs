//! Application settings
//!
//! Settings are a single value, not a collection. Imports replace them
//! wholesale or leave them alone; they are never merged field by field.

use serde::{Deserialize, Serialize};

use super::record::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Id,
    En,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    System,
}

/// User-facing application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// ISO currency code used for display
    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default)]
    pub language: Language,

    #[serde(default)]
    pub theme: Theme,

    #[serde(default)]
    pub pin_enabled: bool,

    #[serde(default)]
    pub pin_hash: Option<String>,

    /// Export timestamp of the backup these settings were adopted from
    #[serde(
        rename = "_exportedAt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub exported_at: Option<Timestamp>,
}

fn default_currency() -> String {
    "IDR".to_string()
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            language: Language::default(),
            theme: Theme::default(),
            pin_enabled: false,
            pin_hash: None,
            exported_at: None,
        }
    }
}
