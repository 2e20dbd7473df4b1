//! List metadata, sort order and the active working set

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::ListId;
use super::item::{total_of, Item, ItemId};
use super::money::Money;

/// Registry summary of one persisted list
///
/// `total_amount` caches the sum of line totals as of the last save; the
/// items in the backing file stay the source of truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMetadata {
    pub id: ListId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
    pub total_amount: Money,
    pub storage_path: PathBuf,
}

impl ListMetadata {
    /// Metadata for a list that has just been created and holds no items
    pub fn new(name: impl Into<String>, storage_path: PathBuf, now: DateTime<Utc>) -> Self {
        Self {
            id: ListId::new(),
            name: name.into(),
            created_at: now,
            last_modified_at: now,
            total_amount: Money::zero(),
            storage_path,
        }
    }

    /// File name of the backing file, if the path has one
    pub fn file_name(&self) -> Option<&str> {
        self.storage_path.file_name().and_then(|n| n.to_str())
    }
}

/// Registry ordering; every key sorts descending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Most recently saved first
    #[default]
    LastModified,
    /// Most recently created first
    CreatedDate,
    /// Largest total first
    TotalAmount,
}

impl SortOrder {
    /// Every sort order, in menu order
    pub fn all() -> &'static [SortOrder] {
        &[Self::LastModified, Self::CreatedDate, Self::TotalAmount]
    }

    /// Parse a sort order name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "last_modified" | "modified" | "recent" => Some(Self::LastModified),
            "created_date" | "created" => Some(Self::CreatedDate),
            "total_amount" | "total" | "amount" => Some(Self::TotalAmount),
            _ => None,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LastModified => write!(f, "last-modified"),
            Self::CreatedDate => write!(f, "created"),
            Self::TotalAmount => write!(f, "total"),
        }
    }
}

/// The items of the one list currently open for editing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingSet {
    /// Registry entry this working set belongs to (looked up by value)
    pub list_id: ListId,
    pub items: Vec<Item>,
}

impl WorkingSet {
    /// Create a working set bound to a list
    pub fn new(list_id: ListId, items: Vec<Item>) -> Self {
        Self { list_id, items }
    }

    /// Sum of line totals
    pub fn total(&self) -> Money {
        total_of(&self.items)
    }

    /// `max(existing ids) + 1`, or 0 for an empty set
    pub fn next_item_id(&self) -> ItemId {
        self.items
            .iter()
            .map(|item| item.id)
            .max()
            .map_or(0, |max| max.saturating_add(1))
    }

    /// Index of the item with `id`
    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }
}
