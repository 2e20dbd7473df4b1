//! Custom error types for shoplist
//!
//! This module defines the error hierarchy for the engine using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for shoplist operations
#[derive(Error, Debug)]
pub enum ShoplistError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for user-entered data
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// File name or content does not match any known list format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A whole document could not be read by its codec
    #[error("Parse error: {0}")]
    Parse(String),

    /// Spreadsheet encode/decode errors
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// Import errors
    #[error("Import error: {0}")]
    Import(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// An operation needed an active working set but none is loaded
    #[error("No shopping list is currently open")]
    NoActiveList,
}

impl ShoplistError {
    /// Create a "not found" error for lists
    pub fn list_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "List",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for items
    pub fn item_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Item",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for ShoplistError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ShoplistError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<calamine::XlsxError> for ShoplistError {
    fn from(err: calamine::XlsxError) -> Self {
        Self::Spreadsheet(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for ShoplistError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Spreadsheet(err.to_string())
    }
}

/// Result type alias for shoplist operations
pub type ShoplistResult<T> = Result<T, ShoplistError>;
