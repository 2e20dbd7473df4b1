//! Format codecs for list files
//!
//! Every on-disk representation is a variant of the closed [`FormatKind`]
//! set with one `parse` and (for writable kinds) one `serialize` function:
//! - Plain text, standard dialect: `name: price: quantity` lines
//! - Plain text, legacy dialect: banner and dashed-separator layout, read only
//! - CSV
//! - Spreadsheet (`.xlsx`)
//!
//! Parsing is lenient: a row that cannot be split is skipped and a numeric
//! field that does not parse reads as zero. Serialized output always carries
//! the list name, its creation time, the export time and a grand total
//! recomputed from the items being written.

pub mod csv;
pub mod detect;
pub mod plain_text;
pub mod spreadsheet;

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Local, Utc};

use crate::error::ShoplistResult;
use crate::models::{Item, ListMetadata};

pub use detect::{detect, detect_path};

/// Every list format the engine can read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    PlainTextLegacy,
    PlainTextStandard,
    Csv,
    Spreadsheet,
}

impl FormatKind {
    /// Parse a whole document into items with ids `0..n` in document order
    pub fn parse(self, bytes: &[u8]) -> ShoplistResult<Vec<Item>> {
        match self {
            Self::PlainTextLegacy => Ok(plain_text::parse_legacy(bytes)),
            Self::PlainTextStandard => Ok(plain_text::parse_standard(bytes)),
            Self::Csv => csv::parse(bytes),
            Self::Spreadsheet => spreadsheet::parse(bytes),
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlainTextLegacy => write!(f, "plain text (legacy)"),
            Self::PlainTextStandard => write!(f, "plain text"),
            Self::Csv => write!(f, "CSV"),
            Self::Spreadsheet => write!(f, "spreadsheet"),
        }
    }
}

/// Formats the engine writes; the legacy dialect is deliberately absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Text,
    Csv,
    Spreadsheet,
}

impl ExportFormat {
    /// Parse a format name as typed by a user
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "txt" | "text" | "plain" => Some(Self::Text),
            "csv" => Some(Self::Csv),
            "xlsx" | "excel" | "spreadsheet" => Some(Self::Spreadsheet),
            _ => None,
        }
    }

    /// File extension, without the dot
    pub fn extension(self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Csv => "csv",
            Self::Spreadsheet => "xlsx",
        }
    }

    /// The format a list's own backing file is rewritten in
    ///
    /// `.csv` and `.xlsx` lists keep their format; everything else is written
    /// as standard plain text.
    pub fn for_storage_path(path: &Path) -> Self {
        match detect::extension_of(path).as_deref() {
            Some("csv") => Self::Csv,
            Some("xlsx") => Self::Spreadsheet,
            _ => Self::Text,
        }
    }

    /// The reader that understands this format's output
    pub fn kind(self) -> FormatKind {
        match self {
            Self::Text => FormatKind::PlainTextStandard,
            Self::Csv => FormatKind::Csv,
            Self::Spreadsheet => FormatKind::Spreadsheet,
        }
    }

    /// Serialize `items` as a complete document for `list`
    ///
    /// `exported_at` is stamped into the document; the list's own
    /// `last_modified_at` is never used.
    pub fn serialize(
        self,
        items: &[Item],
        list: &ListMetadata,
        exported_at: DateTime<Utc>,
    ) -> ShoplistResult<Vec<u8>> {
        match self {
            Self::Text => Ok(plain_text::serialize(items, list, exported_at)),
            Self::Csv => csv::serialize(items, list, exported_at),
            Self::Spreadsheet => spreadsheet::serialize(items, list, exported_at),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Title written at the top of CSV and spreadsheet documents
pub(crate) const TITLE_PREFIX: &str = "Shopping List: ";

/// Column labels written above the item rows of tabular documents
pub(crate) const COLUMN_LABELS: [&str; 4] = ["Item", "Price", "Quantity", "Total"];

/// Label of the grand total row
pub(crate) const TOTAL_LABEL: &str = "Total";

/// Timestamp layout used inside every document
pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

/// Whether a row's first two cells are the `Item` / `Price` column labels
pub(crate) fn is_column_label_row(name: &str, price: &str) -> bool {
    name.trim().eq_ignore_ascii_case(COLUMN_LABELS[0])
        && price.trim().eq_ignore_ascii_case(COLUMN_LABELS[1])
}

/// Index of the first item row of a tabular document
///
/// `labels` yields the first two cells of each row. Row 0 is always a header.
/// Exported documents carry a title/metadata preamble that ends with the
/// column label row; items start right after it.
pub(crate) fn first_item_row<'a, I>(labels: I) -> usize
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    labels
        .into_iter()
        .position(|(name, price)| is_column_label_row(name, price))
        .map_or(1, |header| header + 1)
}

/// Whether a tabular row is the grand total row rather than an item
pub(crate) fn is_total_row(name: &str, price_cell_empty: bool) -> bool {
    price_cell_empty && name.trim().eq_ignore_ascii_case(TOTAL_LABEL)
}
