//! User settings for shoplist
//!
//! Persists the registry sort order, the auto-save period and display
//! preferences in `config.json`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::paths::ShoplistPaths;
use crate::error::ShoplistError;
use crate::models::SortOrder;
use crate::storage::file_io::write_json_atomic;

/// User settings for shoplist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Order the registry is presented in
    #[serde(default)]
    pub sort_order: SortOrder,

    /// Period of the background auto-save, in milliseconds
    #[serde(default = "default_autosave_interval_ms")]
    pub autosave_interval_ms: u64,

    /// Currency label shown next to totals
    #[serde(default = "default_currency")]
    pub currency_symbol: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_autosave_interval_ms() -> u64 {
    5_000
}

fn default_currency() -> String {
    "Kshs.".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            sort_order: SortOrder::default(),
            autosave_interval_ms: default_autosave_interval_ms(),
            currency_symbol: default_currency(),
        }
    }
}

impl Settings {
    /// Auto-save period as a `Duration` (never zero)
    pub fn autosave_interval(&self) -> Duration {
        Duration::from_millis(self.autosave_interval_ms.max(1))
    }

    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &ShoplistPaths) -> Result<Self, ShoplistError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                ShoplistError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                ShoplistError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &ShoplistPaths) -> Result<(), ShoplistError> {
        paths.ensure_directories()?;

        write_json_atomic(paths.settings_file(), self)
    }
}
