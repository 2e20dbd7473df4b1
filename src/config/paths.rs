//! Path management for shoplist
//!
//! Resolves the storage root and the directories hanging off it.
//!
//! ## Path Resolution Order
//!
//! 1. `SHOPLIST_DATA_DIR` environment variable (if set)
//! 2. The platform data directory (`~/.local/share/shoplist` on Linux,
//!    `~/Library/Application Support/shoplist` on macOS,
//!    `%APPDATA%\shoplist\data` on Windows)

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::ShoplistError;

/// Environment variable that overrides the storage root
pub const DATA_DIR_ENV: &str = "SHOPLIST_DATA_DIR";

/// Manages all paths used by shoplist
#[derive(Debug, Clone)]
pub struct ShoplistPaths {
    /// Base directory for all shoplist data
    base_dir: PathBuf,
}

impl ShoplistPaths {
    /// Create a new ShoplistPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no platform data directory can be determined and
    /// the override variable is unset.
    pub fn new() -> Result<Self, ShoplistError> {
        let base_dir = if let Ok(custom) = std::env::var(DATA_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create ShoplistPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Directory holding one file per list
    pub fn lists_dir(&self) -> PathBuf {
        self.base_dir.join("Shopping Lists")
    }

    /// Directory receiving export artifacts; never scanned
    pub fn export_dir(&self) -> PathBuf {
        self.base_dir.join("Downloads")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), ShoplistError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| ShoplistError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.lists_dir())
            .map_err(|e| ShoplistError::Io(format!("Failed to create lists directory: {}", e)))?;

        std::fs::create_dir_all(self.export_dir())
            .map_err(|e| ShoplistError::Io(format!("Failed to create export directory: {}", e)))?;

        Ok(())
    }
}

fn resolve_default_path() -> Result<PathBuf, ShoplistError> {
    ProjectDirs::from("", "", "shoplist")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| ShoplistError::Config("Could not determine a data directory".into()))
}
