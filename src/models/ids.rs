//! Strongly-typed list identifier
//!
//! List ids are opaque and only meaningful for the lifetime of a registry;
//! they are never written into list files.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const DISPLAY_PREFIX: &str = "lst-";

/// Opaque unique identifier of a list in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(Uuid);

impl ListId {
    /// Create a new random ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Whether `s` names this id, either as a full UUID or in the short
    /// `lst-xxxxxxxx` display form
    pub fn matches(&self, s: &str) -> bool {
        let s = s.trim();
        s.eq_ignore_ascii_case(&self.0.to_string()) || s.eq_ignore_ascii_case(&self.to_string())
    }
}

impl Default for ListId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", DISPLAY_PREFIX, &self.0.to_string()[..8])
    }
}
